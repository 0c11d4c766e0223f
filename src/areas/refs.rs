//! Git references (branches, HEAD, tags)
//!
//! This module manages Git references which are human-readable names pointing to objects.
//! References can be:
//! - Direct: Containing a SHA-1
//! - Symbolic: Pointing to another reference (e.g., HEAD -> refs/heads/master)
//!
//! ## File Format
//!
//! References are stored as text files containing either:
//! - A 40-character SHA-1 hash followed by a newline (direct reference)
//! - `ref: <name>` followed by a newline (symbolic reference)
//!
//! A symbolic reference whose target file does not exist is an unborn
//! branch; resolving it yields `None` rather than an error.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Error;
use anyhow::Context;
use derive_new::new;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Namespaces searched, in order, when a short name is resolved
pub const REF_SEARCH_PREFIXES: [&str; 3] = ["refs/", "refs/heads/", "refs/tags/"];

/// Upper bound on symbolic indirections, guards against cycles
const MAX_SYMREF_DEPTH: usize = 16;

/// Reference names are relative paths that stay below the metadata directory
pub fn is_safe_ref_path(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['\\', '\0'])
        && name
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..")
}

/// Parsed content of a reference file
#[derive(Debug, Clone, PartialEq, Eq)]
enum RefValue {
    Symbolic(String),
    Direct(ObjectId),
}

impl RefValue {
    fn read(path: &Path) -> anyhow::Result<Option<RefValue>> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(RefValue::Symbolic(symref_match[1].to_string())))
        } else {
            Ok(Some(RefValue::Direct(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

/// Nested mirror of the `refs/` directory, sorted at each level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefTree {
    children: BTreeMap<String, RefNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefNode {
    /// A reference file; `None` when it is a dangling symbolic reference
    Ref(Option<ObjectId>),
    Namespace(RefTree),
}

impl RefTree {
    pub fn children(&self) -> impl Iterator<Item = (&String, &RefNode)> {
        self.children.iter()
    }

    /// Full names and targets of every resolvable reference, depth first
    pub fn flatten(&self, prefix: &str) -> Vec<(String, ObjectId)> {
        let mut refs = Vec::new();

        for (name, node) in &self.children {
            let full_name = format!("{prefix}/{name}");
            match node {
                RefNode::Ref(Some(oid)) => refs.push((full_name, oid.clone())),
                RefNode::Ref(None) => {}
                RefNode::Namespace(tree) => refs.extend(tree.flatten(&full_name)),
            }
        }

        refs
    }
}

/// Git references manager rooted at the metadata directory
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (typically `.git`)
    path: Box<Path>,
}

impl Refs {
    /// Follow `name` (relative to the metadata directory) to an object id
    pub fn resolve(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        let mut name = name.to_string();

        for _ in 0..MAX_SYMREF_DEPTH {
            if !is_safe_ref_path(&name) {
                return Err(Error::NoSuchReference(name).into());
            }
            match RefValue::read(&self.path.join(&name))? {
                Some(RefValue::Symbolic(target)) => name = target,
                Some(RefValue::Direct(oid)) => return Ok(Some(oid)),
                None => return Ok(None),
            }
        }

        anyhow::bail!("too many levels of symbolic references at {name}")
    }

    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.resolve(HEAD_REF_NAME)
    }

    /// Whether a reference file with this full name exists
    pub fn exists(&self, name: &str) -> bool {
        is_safe_ref_path(name) && self.path.join(name).is_file()
    }

    /// Point `refs/<name>` at `oid`, overwriting any previous value
    pub fn create(&self, name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let ref_path = self.refs_path().join(name);
        self.update_ref_file(&ref_path, format!("{oid}\n"))?;

        tracing::debug!(reference = %format!("refs/{name}"), %oid, "updated reference");
        Ok(())
    }

    /// Advance the branch HEAD points to, or move a detached HEAD
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let mut name = HEAD_REF_NAME.to_string();

        for _ in 0..MAX_SYMREF_DEPTH {
            if !is_safe_ref_path(&name) {
                return Err(Error::NoSuchReference(name).into());
            }
            match RefValue::read(&self.path.join(&name))? {
                Some(RefValue::Symbolic(target)) => name = target,
                Some(RefValue::Direct(_)) | None => {
                    self.update_ref_file(&self.path.join(&name), format!("{oid}\n"))?;
                    tracing::debug!(reference = %name, %oid, "updated reference");
                    return Ok(());
                }
            }
        }

        anyhow::bail!("too many levels of symbolic references at {name}")
    }

    /// Branch HEAD points to, without the `refs/heads/` prefix
    ///
    /// `None` when HEAD is detached.
    pub fn active_branch(&self) -> anyhow::Result<Option<String>> {
        match RefValue::read(&self.head_path())? {
            Some(RefValue::Symbolic(target)) => Ok(target
                .strip_prefix("refs/heads/")
                .map(|branch| branch.to_string())),
            _ => Ok(None),
        }
    }

    /// Full reference names that exist for a short name, in search order
    pub fn find_candidates(&self, name: &str) -> Vec<String> {
        REF_SEARCH_PREFIXES
            .iter()
            .map(|prefix| format!("{prefix}{name}"))
            .filter(|full_name| self.exists(full_name))
            .collect()
    }

    pub fn create_branch(&self, name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        let ref_name = name.to_ref_name();
        if self.exists(&ref_name) {
            return Err(Error::AlreadyExists(format!("branch '{name}'")).into());
        }

        self.create(ref_name.trim_start_matches("refs/"), oid)
    }

    pub fn list_branches(&self) -> anyhow::Result<Vec<String>> {
        let heads = self.list()?;
        Ok(heads
            .flatten("refs")
            .into_iter()
            .filter_map(|(name, _)| name.strip_prefix("refs/heads/").map(str::to_string))
            .collect())
    }

    /// Mirror `refs/` as a nested tree
    pub fn list(&self) -> anyhow::Result<RefTree> {
        self.list_dir(&self.refs_path(), "refs")
    }

    fn list_dir(&self, dir: &Path, name: &str) -> anyhow::Result<RefTree> {
        let mut tree = RefTree::default();
        if !dir.is_dir() {
            return Ok(tree);
        }

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            let child_name = format!("{name}/{file_name}");

            let node = if entry.file_type()?.is_dir() {
                RefNode::Namespace(self.list_dir(&entry.path(), &child_name)?)
            } else {
                RefNode::Ref(self.resolve(&child_name)?)
            };
            tree.children.insert(file_name, node);
        }

        Ok(tree)
    }

    fn update_ref_file(&self, path: &Path, raw_ref: String) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        std::fs::write(path, raw_ref)
            .with_context(|| format!("failed to write ref file at {:?}", path))
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }
}
