use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use crate::errors::Error;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Name of the metadata directory, never part of the worktree listing
pub const GIT_DIR_NAME: &str = ".git";

/// Working tree rooted at the repository's top-level directory
///
/// Paths handed out and accepted are worktree-relative and `/` separated.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn abs_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Every file (or symlink) below the worktree, metadata root excluded
    pub fn list_files(&self) -> anyhow::Result<Vec<String>> {
        self.list_files_under(&self.path)
    }

    fn list_files_under(&self, root: &Path) -> anyhow::Result<Vec<String>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != GIT_DIR_NAME);

        for entry in walker {
            let entry = entry.with_context(|| format!("Unable to walk {}", root.display()))?;
            if entry.file_type().is_dir() {
                continue;
            }
            if let Some(name) = self.to_name(entry.path()) {
                files.push(name);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Map a user-supplied path onto a worktree-relative name
    ///
    /// Relative paths are taken from the current directory. The path does not
    /// need to exist.
    pub fn relative_name(&self, path: &Path) -> anyhow::Result<String> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let absolute = normalize(&absolute);

        let relative = absolute
            .strip_prefix(&self.path)
            .map_err(|_| Error::PathOutsideWorktree(path.to_path_buf()))?;
        if relative
            .components()
            .next()
            .is_some_and(|c| c.as_os_str() == GIT_DIR_NAME)
        {
            return Err(Error::PathOutsideWorktree(path.to_path_buf()).into());
        }

        Ok(to_slash(relative))
    }

    /// Expand a user-supplied path into the files it designates
    ///
    /// Directories expand to every file below them; anything else must be a
    /// regular file.
    pub fn expand(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        let name = self.relative_name(path)?;
        let absolute = self.abs_path(&name);

        let metadata = std::fs::symlink_metadata(&absolute)
            .map_err(|_| Error::NotAFile(path.to_path_buf()))?;
        if metadata.is_dir() {
            return self.list_files_under(&absolute);
        }
        if !metadata.is_file() {
            return Err(Error::NotAFile(path.to_path_buf()).into());
        }

        Ok(vec![name])
    }

    /// File content, or the link target for symlinks
    pub fn read_file(&self, name: &str) -> anyhow::Result<Bytes> {
        let path = self.abs_path(name);
        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("Unable to stat {}", path.display()))?;

        if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(&path)?;
            return Ok(Bytes::from(target.to_string_lossy().into_owned().into_bytes()));
        }

        let content =
            std::fs::read(&path).with_context(|| format!("Unable to read {}", path.display()))?;
        Ok(Bytes::from(content))
    }

    pub fn parse_blob(&self, name: &str) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(name)?))
    }

    /// Stat data for `name`, `None` if it no longer exists
    pub fn stat_file(&self, name: &str) -> anyhow::Result<Option<EntryMetadata>> {
        let path = self.abs_path(name);
        match std::fs::symlink_metadata(&path) {
            Ok(metadata) if metadata.is_dir() => Ok(None),
            Ok(metadata) => Ok(Some((path.as_path(), &metadata).try_into()?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("Unable to stat {}", path.display())),
        }
    }

    /// Delete a tracked file and any directories it leaves empty
    pub fn remove_file(&self, name: &str) -> anyhow::Result<()> {
        let path = self.abs_path(name);
        if std::fs::symlink_metadata(&path).is_err() {
            return Ok(());
        }
        std::fs::remove_file(&path)
            .with_context(|| format!("Unable to remove {}", path.display()))?;

        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir == self.path.as_ref() || std::fs::remove_dir(dir).is_err() {
                break;
            }
            parent = dir.parent();
        }

        Ok(())
    }

    fn to_name(&self, path: &Path) -> Option<String> {
        path.strip_prefix(self.path.as_ref()).ok().map(to_slash)
    }
}

/// Resolve `.` and `..` lexically, without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::kind_of;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        dir.child(".git/HEAD").write_str("ref: refs/heads/master\n").unwrap();
        dir.child("b.txt").write_str("b").unwrap();
        dir.child("a/c.txt").write_str("c").unwrap();
        dir.child("a/d/e.txt").write_str("e").unwrap();
        dir
    }

    fn workspace(dir: &TempDir) -> Workspace {
        Workspace::new(dir.path().canonicalize().unwrap().into_boxed_path())
    }

    #[rstest]
    fn listing_skips_the_metadata_root(dir: TempDir) {
        assert_eq!(
            workspace(&dir).list_files().unwrap(),
            vec!["a/c.txt", "a/d/e.txt", "b.txt"]
        );
    }

    #[rstest]
    fn directories_expand_to_their_files(dir: TempDir) {
        let workspace = workspace(&dir);
        let a = workspace.path().join("a");

        assert_eq!(workspace.expand(&a).unwrap(), vec!["a/c.txt", "a/d/e.txt"]);
    }

    #[rstest]
    fn paths_outside_the_worktree_are_rejected(dir: TempDir) {
        let workspace = workspace(&dir);
        let outside = workspace.path().join("..").join("elsewhere.txt");

        let err = workspace.relative_name(&outside).unwrap_err();
        assert_eq!(kind_of(&err), Some(&Error::PathOutsideWorktree(outside)));

        let inside_git = workspace.path().join(".git/HEAD");
        assert!(workspace.relative_name(&inside_git).is_err());
    }

    #[rstest]
    fn missing_paths_are_not_files(dir: TempDir) {
        let workspace = workspace(&dir);
        let missing = workspace.path().join("missing.txt");

        let err = workspace.expand(&missing).unwrap_err();
        assert_eq!(kind_of(&err), Some(&Error::NotAFile(missing)));
    }

    #[rstest]
    fn removing_the_last_file_prunes_empty_directories(dir: TempDir) {
        let workspace = workspace(&dir);

        workspace.remove_file("a/d/e.txt").unwrap();

        assert!(!workspace.path().join("a/d").exists());
        assert!(workspace.path().join("a/c.txt").exists());
    }
}
