//! Git object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character lowercase hexadecimal strings representing SHA-1
//! hashes of `<type> <size>\0<payload>`.
//!
//! ## Storage
//!
//! Objects are stored in `.git/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::{OBJECT_ID_LENGTH, RAW_OBJECT_ID_LENGTH};
use crate::errors::Error;
use std::io;
use std::path::PathBuf;

/// Git object identifier (SHA-1 hash)
///
/// Always holds the normalised lowercase spelling, so two ids compare equal
/// exactly when they name the same object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a 40-character hex string
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidObjectId(id).into());
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Build an object ID from the raw 20-byte digest
    pub fn from_raw(raw: &[u8]) -> anyhow::Result<Self> {
        if raw.len() != RAW_OBJECT_ID_LENGTH {
            return Err(Error::InvalidObjectId(format!("{} raw bytes", raw.len())).into());
        }

        Ok(Self(raw.iter().map(|byte| format!("{byte:02x}")).collect()))
    }

    /// Write the object ID in binary format (20 bytes)
    ///
    /// Used when serializing tree objects and index entries.
    pub fn write_h40_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        writer.write_all(&self.to_raw()?)?;
        Ok(())
    }

    /// Read an object ID from binary format (20 bytes)
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut buffer = [0; RAW_OBJECT_ID_LENGTH];
        reader.read_exact(&mut buffer)?;

        Self::from_raw(&buffer)
    }

    pub fn to_raw(&self) -> anyhow::Result<[u8; RAW_OBJECT_ID_LENGTH]> {
        let mut raw = [0u8; RAW_OBJECT_ID_LENGTH];

        for (i, byte) in raw.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&self.0[2 * i..2 * i + 2], 16)
                .map_err(|_| Error::InvalidObjectId(self.0.clone()))?;
        }

        Ok(raw)
    }

    /// Convert to file system path for object storage
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hash (standard Git abbreviation)
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
