//! Index entry representation
//!
//! Each entry in the index represents a tracked file with:
//! - File path
//! - Content hash (object ID)
//! - File metadata (mode, size, timestamps)
//!
//! ## Entry Format
//!
//! ```text
//! ctime sec/nsec, mtime sec/nsec      16 bytes
//! dev, ino                             8 bytes
//! reserved (zero), mode                4 bytes
//! uid, gid, size                      12 bytes
//! object id                           20 bytes
//! flags                                2 bytes
//! name, NUL padding to 8 bytes        variable
//! ```
//!
//! The metadata enables fast change detection without reading file content.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Error;
use bitflags::bitflags;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::fs::Metadata;
use std::io::{BufRead, Write};
use std::os::unix::prelude::MetadataExt;
use std::path::Path;

/// Name lengths at or above this value are not stored; the name is NUL-scanned
pub const MAX_NAME_LENGTH: usize = 0xFFF;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Size of the fixed part of an entry, up to and including the flags
pub const ENTRY_PREFIX_SIZE: usize = 62;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EntryFlags: u16 {
        const ASSUME_VALID = 0x8000;
        const EXTENDED = 0x4000;
        const STAGE = 0x3000;
        const NAME_LENGTH = 0x0FFF;
    }
}

/// 4-bit object type stored in the mode field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexModeType {
    #[default]
    Regular,
    Symlink,
    Gitlink,
}

impl IndexModeType {
    pub fn bits(&self) -> u16 {
        match self {
            IndexModeType::Regular => 0b1000,
            IndexModeType::Symlink => 0b1010,
            IndexModeType::Gitlink => 0b1110,
        }
    }
}

impl TryFrom<u16> for IndexModeType {
    type Error = anyhow::Error;

    fn try_from(bits: u16) -> anyhow::Result<Self> {
        match bits {
            0b1000 => Ok(IndexModeType::Regular),
            0b1010 => Ok(IndexModeType::Symlink),
            0b1110 => Ok(IndexModeType::Gitlink),
            other => Err(Error::CorruptIndex(format!("unknown mode type {other:#06b}")).into()),
        }
    }
}

/// Index entry representing a tracked file
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Worktree-relative path, `/` separated
    pub name: String,
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    pub fn basename(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Directory holding the entry, `""` for the worktree root
    pub fn dirname(&self) -> &str {
        self.name.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }

    pub fn mode(&self) -> EntryMode {
        self.metadata.entry_mode()
    }

    /// Whether the stat data still describes the file, so it need not be rehashed
    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.ctime == other.ctime
            && self.metadata.ctime_nsec == other.ctime_nsec
            && self.metadata.mtime == other.mtime
            && self.metadata.mtime_nsec == other.mtime_nsec
    }

    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        let meta = &self.metadata;
        let mut flags = EntryFlags::from_bits_retain(self.name.len().min(MAX_NAME_LENGTH) as u16);
        if meta.assume_valid {
            flags |= EntryFlags::ASSUME_VALID;
        }
        flags |= EntryFlags::from_bits_retain((u16::from(meta.stage) & 0b11) << 12);

        let mut entry_bytes = Vec::with_capacity(ENTRY_PREFIX_SIZE + self.name.len() + ENTRY_BLOCK);
        entry_bytes.write_u32::<byteorder::NetworkEndian>(meta.ctime)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(meta.ctime_nsec)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(meta.mtime)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(meta.mtime_nsec)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(meta.dev)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(meta.ino)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(0)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(
            (meta.mode_type.bits() << 12) | (meta.mode_perms & 0o777),
        )?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(meta.uid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(meta.gid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(meta.size)?;
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(flags.bits())?;
        entry_bytes.write_all(self.name.as_bytes())?;

        // There must be at least one null byte at the end
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }

    /// Decode one entry, leaving `reader` positioned at the next one
    pub fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let truncated = || Error::CorruptIndex("truncated entry".to_string());

        let mut bytes = [0u8; ENTRY_PREFIX_SIZE];
        reader.read_exact(&mut bytes).map_err(|_| truncated())?;

        let reserved = byteorder::NetworkEndian::read_u16(&bytes[24..26]);
        if reserved != 0 {
            let reason = format!("reserved mode bits set ({reserved:#x})");
            return Err(Error::CorruptIndex(reason).into());
        }
        let mode = byteorder::NetworkEndian::read_u16(&bytes[26..28]);
        let mode_type = IndexModeType::try_from(mode >> 12)?;

        let oid = ObjectId::from_raw(&bytes[40..60])?;

        let flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]);
        let flags = EntryFlags::from_bits_retain(flags);
        if flags.contains(EntryFlags::EXTENDED) {
            let reason = "extended flags are not valid in version 2".to_string();
            return Err(Error::CorruptIndex(reason).into());
        }
        let name_length = (flags & EntryFlags::NAME_LENGTH).bits() as usize;

        let mut name_bytes = Vec::new();
        let consumed = if name_length < MAX_NAME_LENGTH {
            name_bytes.resize(name_length, 0);
            reader.read_exact(&mut name_bytes).map_err(|_| truncated())?;
            ENTRY_PREFIX_SIZE + name_length
        } else {
            reader.read_until(0, &mut name_bytes)?;
            if name_bytes.pop() != Some(0) {
                return Err(truncated().into());
            }
            ENTRY_PREFIX_SIZE + name_bytes.len() + 1
        };
        let name = String::from_utf8(name_bytes)
            .map_err(|_| Error::CorruptIndex("entry name is not UTF-8".to_string()))?;

        // Skip the padding up to the 8-byte boundary of NUL-terminated name
        let padded = (ENTRY_PREFIX_SIZE + name.len()) / ENTRY_BLOCK * ENTRY_BLOCK + ENTRY_BLOCK;
        let mut padding = vec![0u8; padded - consumed];
        reader.read_exact(&mut padding).map_err(|_| truncated())?;

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime: byteorder::NetworkEndian::read_u32(&bytes[0..4]),
                ctime_nsec: byteorder::NetworkEndian::read_u32(&bytes[4..8]),
                mtime: byteorder::NetworkEndian::read_u32(&bytes[8..12]),
                mtime_nsec: byteorder::NetworkEndian::read_u32(&bytes[12..16]),
                dev: byteorder::NetworkEndian::read_u32(&bytes[16..20]),
                ino: byteorder::NetworkEndian::read_u32(&bytes[20..24]),
                mode_type,
                mode_perms: mode & 0o777,
                uid: byteorder::NetworkEndian::read_u32(&bytes[28..32]),
                gid: byteorder::NetworkEndian::read_u32(&bytes[32..36]),
                size: byteorder::NetworkEndian::read_u32(&bytes[36..40]),
                assume_valid: flags.contains(EntryFlags::ASSUME_VALID),
                stage: ((flags & EntryFlags::STAGE).bits() >> 12) as u8,
            },
        })
    }
}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.as_bytes().cmp(other.name.as_bytes())
    }
}

/// File metadata stored in index entries
///
/// Field widths follow the on-disk format; wider stat values are truncated
/// the way git truncates them.
///
/// ## Timestamps
///
/// - `ctime`: File status change time (inode modification)
/// - `mtime`: File content modification time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: u32,
    pub ctime_nsec: u32,
    pub mtime: u32,
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode_type: IndexModeType,
    /// 9-bit permission mask
    pub mode_perms: u16,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
    pub assume_valid: bool,
    pub stage: u8,
}

impl EntryMetadata {
    /// Mode used for the entry when it is written into a tree
    pub fn entry_mode(&self) -> EntryMode {
        match self.mode_type {
            IndexModeType::Regular if self.mode_perms & 0o111 != 0 => {
                EntryMode::File(FileMode::Executable)
            }
            IndexModeType::Regular => EntryMode::File(FileMode::Regular),
            IndexModeType::Symlink => EntryMode::Symlink,
            IndexModeType::Gitlink => EntryMode::Gitlink,
        }
    }
}

impl TryFrom<(&Path, &Metadata)> for EntryMetadata {
    type Error = anyhow::Error;

    fn try_from((file_path, metadata): (&Path, &Metadata)) -> Result<Self, Self::Error> {
        let (mode_type, mode_perms) = if metadata.file_type().is_symlink() {
            (IndexModeType::Symlink, 0)
        } else if file_path.is_executable() {
            (IndexModeType::Regular, 0o755)
        } else {
            (IndexModeType::Regular, 0o644)
        };

        Ok(Self {
            ctime: metadata.ctime() as u32,
            ctime_nsec: metadata.ctime_nsec() as u32,
            mtime: metadata.mtime() as u32,
            mtime_nsec: metadata.mtime_nsec() as u32,
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode_type,
            mode_perms,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
            assume_valid: false,
            stage: 0,
        })
    }
}
