//! Git tree object
//!
//! Trees represent directory snapshots. They contain entries for files (blobs),
//! symlinks, submodule links and subdirectories (other trees), along with their
//! names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`, concatenated without separators.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Error;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// One `<mode> <name> <oid>` record of a tree
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: String,
    pub oid: ObjectId,
}

impl TreeEntry {
    /// A name that stays inside its parent directory when joined onto it
    pub fn has_safe_name(&self) -> bool {
        is_safe_entry_name(&self.name)
    }

    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }

    /// Git orders tree entries by name, with subtrees compared as if their
    /// name ended in `/`.
    fn sort_key(&self) -> Vec<u8> {
        let mut key = self.name.as_bytes().to_vec();
        if self.is_tree() {
            key.push(b'/');
        }
        key
    }
}

/// Entry names must be a single path component and never the metadata dir
pub fn is_safe_entry_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.eq_ignore_ascii_case(".git")
        && !name.contains(['/', '\0'])
}

/// Git tree object; entries are kept in file order
#[derive(Debug, Clone, Default, PartialEq, Eq, new)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = TreeEntry> {
        self.entries.into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Put the entries in canonical git order
    pub fn sort(&mut self) {
        self.entries.sort_by_key(TreeEntry::sort_key);
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();

        for entry in &self.entries {
            write!(content_bytes, "{} {}", entry.mode.as_str(), entry.name)?;
            content_bytes.push(0);
            entry.oid.write_h40_to(&mut content_bytes)?;
        }

        Ok(Bytes::from(content_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = Vec::new();

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            // Read "mode " (space-delimited)
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(Error::corrupt_object("tree", "unexpected EOF in mode").into());
            }

            let mode_str = std::str::from_utf8(&mode_bytes)
                .map_err(|_| Error::corrupt_object("tree", "mode is not ASCII"))?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            // Read "name\0"
            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                return Err(Error::corrupt_object("tree", "unexpected EOF in name").into());
            }
            let name = String::from_utf8(name_bytes.clone())
                .map_err(|_| Error::corrupt_object("tree", "entry name is not UTF-8"))?;
            if !is_safe_entry_name(&name) {
                let reason = format!("bad entry name '{name}'");
                return Err(Error::corrupt_object("tree", reason).into());
            }

            let oid = ObjectId::read_h40_from(&mut reader)
                .map_err(|_| Error::corrupt_object("tree", "unexpected EOF in object id"))?;

            entries.push(TreeEntry::new(mode, name, oid));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "{} {} {}\t{}",
                    entry.mode,
                    entry.mode.object_kind(),
                    entry.oid,
                    entry.name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use crate::artifacts::objects::blob::Blob;
    use pretty_assertions::assert_eq;

    fn oid_of(content: &str) -> ObjectId {
        Blob::from(content).object_id().unwrap()
    }

    #[test]
    fn empty_tree_has_the_well_known_id() {
        assert_eq!(
            Tree::default().object_id().unwrap().as_ref(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }

    #[test]
    fn payload_is_mode_name_nul_and_raw_id() {
        let oid = oid_of("");
        let tree = Tree::new(vec![TreeEntry::new(
            EntryMode::File(FileMode::Regular),
            "a.txt".to_string(),
            oid.clone(),
        )]);

        let payload = tree.serialize().unwrap();

        let mut expected = b"100644 a.txt\0".to_vec();
        expected.extend_from_slice(&oid.to_raw().unwrap());
        assert_eq!(payload.to_vec(), expected);
    }

    #[test]
    fn five_and_six_digit_modes_decode() {
        let oid = oid_of("x");
        let mut payload = b"40000 dir\0".to_vec();
        payload.extend_from_slice(&oid.to_raw().unwrap());
        payload.extend_from_slice(b"100755 run.sh\0");
        payload.extend_from_slice(&oid.to_raw().unwrap());

        let tree = Tree::deserialize(&payload[..]).unwrap();
        let entries = tree.entries().cloned().collect::<Vec<_>>();

        assert_eq!(
            entries,
            vec![
                TreeEntry::new(EntryMode::Directory, "dir".to_string(), oid.clone()),
                TreeEntry::new(
                    EntryMode::File(FileMode::Executable),
                    "run.sh".to_string(),
                    oid
                ),
            ]
        );
    }

    #[test]
    fn truncated_payload_is_corrupt() {
        let payload = b"100644 a.txt\0abc".to_vec();
        assert!(Tree::deserialize(&payload[..]).is_err());
    }

    #[test]
    fn entry_names_that_leave_the_directory_are_corrupt() {
        let oid = oid_of("x");
        for name in ["..", ".", ".git", ".GIT", "", "a/b", "../escape.txt"] {
            let mut payload = format!("100644 {name}\0").into_bytes();
            payload.extend_from_slice(&oid.to_raw().unwrap());

            let err = Tree::deserialize(&payload[..]).unwrap_err();
            assert!(
                matches!(
                    crate::errors::kind_of(&err),
                    Some(Error::CorruptObject { .. })
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn dotted_names_that_stay_inside_are_accepted() {
        for name in ["...", ".gitignore", ".github", "a..b"] {
            assert!(is_safe_entry_name(name), "{name:?}");
        }
    }

    #[test]
    fn sort_places_subtrees_as_if_suffixed_with_slash() {
        let oid = oid_of("");
        let mut tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Directory, "a".to_string(), oid.clone()),
            TreeEntry::new(EntryMode::File(FileMode::Regular), "a.b".to_string(), oid.clone()),
            TreeEntry::new(EntryMode::File(FileMode::Regular), "a-b".to_string(), oid),
        ]);

        tree.sort();

        let names = tree.entries().map(|e| e.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a-b", "a.b", "a"]);
    }
}
