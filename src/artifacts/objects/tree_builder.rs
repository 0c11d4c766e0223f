//! Build the nested tree graph for a flat index
//!
//! Entries are grouped by parent directory, then groups are written deepest
//! first so every subtree id is known before its parent is built.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use std::collections::BTreeMap;

/// Write one tree per directory of `index` and return the root tree id
pub fn tree_from_index(database: &Database, index: &Index) -> anyhow::Result<ObjectId> {
    let mut groups: BTreeMap<String, Vec<TreeEntry>> = BTreeMap::new();
    groups.insert(String::new(), Vec::new());

    for entry in index.entries() {
        let dirname = entry.dirname();

        // every ancestor needs a group, it will hold at least one subtree
        let mut ancestor = dirname;
        while !ancestor.is_empty() && !groups.contains_key(ancestor) {
            groups.insert(ancestor.to_string(), Vec::new());
            ancestor = parent_of(ancestor);
        }

        if let Some(group) = groups.get_mut(dirname) {
            group.push(TreeEntry::new(
                entry.mode(),
                entry.basename().to_string(),
                entry.oid.clone(),
            ));
        }
    }

    let mut paths = groups.keys().cloned().collect::<Vec<_>>();
    paths.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut root = None;
    for path in paths {
        let entries = groups.remove(&path).unwrap_or_default();
        let mut tree = Tree::new(entries);
        tree.sort();
        let oid = database.store(&tree)?;

        if path.is_empty() {
            root = Some(oid);
            continue;
        }

        let basename = path.rsplit('/').next().unwrap_or(&path).to_string();
        groups
            .entry(parent_of(&path).to_string())
            .or_default()
            .push(TreeEntry::new(EntryMode::Directory, basename, oid));
    }

    root.ok_or_else(|| anyhow::anyhow!("index produced no root tree"))
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}
