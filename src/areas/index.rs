//! Git index (staging area)
//!
//! The index is Git's staging area that tracks which files should be included in the next commit.
//! It maintains metadata about files including their mode, timestamps, and SHA-1 hashes.
//!
//! ## Index File Format
//!
//! The index file contains:
//! - Header: Signature, version, and entry count
//! - Entries: Sorted list of tracked files with metadata
//! - Checksum: SHA-1 hash of the entire index for integrity verification
//!
//! Every mutating command reads the file, changes the in-memory copy and
//! rewrites it in full; nothing is cached between invocations.

use crate::artifacts::index::checksum::{self, Checksum};
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::HEADER_SIZE;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Git index (staging area)
///
/// Entries are keyed by their worktree-relative name, which keeps them in the
/// byte order git expects on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    path: PathBuf,
    entries: BTreeMap<String, IndexEntry>,
}

impl Index {
    /// Create a new empty index backed by `path`
    pub fn new(path: PathBuf) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
        }
    }

    /// Load the index from disk
    ///
    /// A missing or empty file yields an empty index (fresh repository).
    pub fn load(path: PathBuf) -> anyhow::Result<Self> {
        let mut index = Index::new(path);
        if !index.path.exists() {
            return Ok(index);
        }

        let data = std::fs::read(&index.path)
            .with_context(|| format!("Unable to read index {}", index.path.display()))?;
        index.parse(&data)?;

        tracing::debug!(path = %index.path.display(), entries = index.len(), "loaded index");
        Ok(index)
    }

    fn parse(&mut self, data: &[u8]) -> anyhow::Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let header = IndexHeader::parse(data)?;
        let mut reader = &data[HEADER_SIZE..];

        for _ in 0..header.entries_count {
            let entry = IndexEntry::deserialize(&mut reader)?;
            self.entries.insert(entry.name.clone(), entry);
        }

        // extensions and the trailer follow the entries; only the trailer is checked
        if !reader.is_empty() {
            checksum::verify(data)?;
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn entry_by_path(&self, name: &str) -> Option<&IndexEntry> {
        self.entries.get(name)
    }

    pub fn is_tracked(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Stage `entry`, replacing any entry for the same path
    ///
    /// Entries that would clash with it on disk (a file where the new entry
    /// needs a directory, or files below a path that becomes a file) are
    /// dropped as well.
    pub fn add(&mut self, entry: IndexEntry) {
        let mut parent = entry.dirname();
        while !parent.is_empty() {
            self.entries.remove(parent);
            parent = parent.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
        }

        let prefix = format!("{}/", entry.name);
        self.entries.retain(|name, _| !name.starts_with(&prefix));

        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn remove(&mut self, name: &str) -> Option<IndexEntry> {
        self.entries.remove(name)
    }

    /// Encode the whole index, checksum trailer included
    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let mut writer = Checksum::new(Vec::new());

        let header = IndexHeader::with_entries(self.entries.len() as u32);
        writer.write(&header.serialize()?)?;
        for entry in self.entries.values() {
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()
    }

    /// Rewrite the index file with the current entries
    pub fn write_updates(&self) -> anyhow::Result<()> {
        let bytes = self.to_bytes()?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, bytes)
            .with_context(|| format!("Unable to write index {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), entries = self.len(), "wrote index");
        Ok(())
    }
}
