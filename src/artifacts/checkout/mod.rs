//! Tree materialisation
//!
//! Writes the content of a tree object into a fresh directory. Directories
//! are recreated recursively, executable blobs get mode `0755`, symlink
//! entries become real symlinks on unix and submodule links become empty
//! directories that are not descended into.

use crate::areas::database::Database;
use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Error;
use anyhow::Context;
use derive_new::new;
use std::path::Path;

/// Make sure `target` can receive a checkout: absent, or an empty directory
pub fn prepare_target(target: &Path) -> anyhow::Result<()> {
    if target.exists() {
        if !target.is_dir() {
            return Err(Error::NotADirectory(target.to_path_buf()).into());
        }
        if std::fs::read_dir(target)?.next().is_some() {
            return Err(Error::TargetNotEmpty(target.to_path_buf()).into());
        }
        return Ok(());
    }

    std::fs::create_dir_all(target)
        .with_context(|| format!("Unable to create {}", target.display()))
}

#[derive(new)]
pub struct TreeWriter<'d> {
    database: &'d Database,
}

impl<'d> TreeWriter<'d> {
    /// Materialise `tree_oid` below `dir`, returning the number of files written
    pub fn write_tree(&self, tree_oid: &ObjectId, dir: &Path) -> anyhow::Result<usize> {
        let tree = self.database.load_tree(tree_oid)?;
        let mut written = 0;

        for entry in tree.entries() {
            if !entry.has_safe_name() {
                let reason = format!("entry name '{}' escapes its directory", entry.name);
                return Err(Error::corrupt_object(tree_oid, reason).into());
            }
            let path = dir.join(&entry.name);

            match entry.mode {
                EntryMode::Directory => {
                    std::fs::create_dir(&path)
                        .with_context(|| format!("Unable to create {}", path.display()))?;
                    written += self.write_tree(&entry.oid, &path)?;
                }
                EntryMode::Gitlink => {
                    tracing::trace!(path = %path.display(), "submodule link left empty");
                    std::fs::create_dir(&path)
                        .with_context(|| format!("Unable to create {}", path.display()))?;
                }
                EntryMode::Symlink => {
                    let blob = self.database.load_blob(&entry.oid)?;
                    write_symlink(blob.content(), &path)?;
                    written += 1;
                }
                EntryMode::File(file_mode) => {
                    let blob = self.database.load_blob(&entry.oid)?;
                    std::fs::write(&path, blob.content())
                        .with_context(|| format!("Unable to write {}", path.display()))?;
                    if file_mode == FileMode::Executable {
                        make_executable(&path)?;
                    }
                    written += 1;
                }
            }
            tracing::trace!(path = %path.display(), mode = %entry.mode, "checked out");
        }

        Ok(written)
    }
}

#[cfg(unix)]
fn write_symlink(target: &[u8], path: &Path) -> anyhow::Result<()> {
    use std::os::unix::ffi::OsStrExt;

    let target = std::ffi::OsStr::from_bytes(target);
    std::os::unix::fs::symlink(target, path)
        .with_context(|| format!("Unable to create symlink {}", path.display()))
}

// no portable symlinks: keep the link target as file content, like git does
#[cfg(not(unix))]
fn write_symlink(target: &[u8], path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, target).with_context(|| format!("Unable to write {}", path.display()))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to set permissions for file: {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
