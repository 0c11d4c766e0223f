use crate::errors::Error;

#[derive(Debug, Clone, Copy, Eq, Ord, Hash, Default, PartialEq, PartialOrd)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

/// Mode of a tree entry, classified by its octal type prefix
#[derive(Debug, Clone, Copy, Eq, Ord, Hash, Default, PartialEq, PartialOrd)]
pub enum EntryMode {
    File(FileMode),
    Symlink,
    Gitlink,
    #[default]
    Directory,
}

impl EntryMode {
    /// Canonical git spelling used inside tree objects
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::Symlink => "120000",
            EntryMode::Gitlink => "160000",
            EntryMode::Directory => "40000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Gitlink => 0o160000,
            EntryMode::Directory => 0o40000,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    /// Name of the object kind an entry with this mode points at
    pub fn object_kind(&self) -> &'static str {
        match self {
            EntryMode::Directory => "tree",
            EntryMode::File(_) | EntryMode::Symlink => "blob",
            EntryMode::Gitlink => "commit",
        }
    }

    /// Parse a 5 or 6 digit octal mode as found in tree objects
    pub fn from_octal_str(mode: &str) -> anyhow::Result<Self> {
        if !(5..=6).contains(&mode.len()) {
            return Err(Error::corrupt_object("tree", format!("bad mode '{mode}'")).into());
        }
        let value = u32::from_str_radix(mode, 8)
            .map_err(|_| Error::corrupt_object("tree", format!("bad mode '{mode}'")))?;

        Self::try_from(value)
    }
}

impl TryFrom<u32> for EntryMode {
    type Error = anyhow::Error;

    fn try_from(mode: u32) -> anyhow::Result<Self> {
        match mode >> 12 {
            0o04 => Ok(EntryMode::Directory),
            0o10 if mode & 0o111 != 0 => Ok(EntryMode::File(FileMode::Executable)),
            0o10 => Ok(EntryMode::File(FileMode::Regular)),
            0o12 => Ok(EntryMode::Symlink),
            0o16 => Ok(EntryMode::Gitlink),
            _ => {
                let reason = format!("weird tree leaf mode {mode:o}");
                Err(Error::corrupt_object("tree", reason).into())
            }
        }
    }
}

impl From<EntryMode> for u32 {
    fn from(mode: EntryMode) -> Self {
        mode.as_u32()
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.as_u32())
    }
}
