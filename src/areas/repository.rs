//! Repository handle
//!
//! A repository is a worktree root plus its `.git` metadata directory. The
//! handle owns the object database, the reference store and the workspace,
//! and carries the writer every command prints to.

use crate::areas::config::{self, Config};
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::{GIT_DIR_NAME, Workspace};
use crate::errors::Error;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Branch HEAD points at in a new repository
pub const DEFAULT_BRANCH: &str = "master";

const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

pub struct Repository {
    git_path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    config: Config,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Initialise a repository at `path`
    ///
    /// `path` must be absent or an empty directory.
    pub fn create(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if path.exists() {
            if !path.is_dir() {
                let what = format!("{} (not a directory)", path.display());
                return Err(Error::AlreadyExists(what).into());
            }
            if std::fs::read_dir(path)?.next().is_some() {
                return Err(Error::AlreadyExists(format!("{} (not empty)", path.display())).into());
            }
        } else {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Unable to create {}", path.display()))?;
        }

        let git_path = path.join(GIT_DIR_NAME);
        for dir in ["branches", "objects", "refs/heads", "refs/tags"] {
            std::fs::create_dir_all(git_path.join(dir))
                .with_context(|| format!("Unable to create {}", git_path.join(dir).display()))?;
        }
        std::fs::write(git_path.join("description"), DEFAULT_DESCRIPTION)?;
        std::fs::write(
            git_path.join("HEAD"),
            format!("ref: refs/heads/{DEFAULT_BRANCH}\n"),
        )?;
        std::fs::write(git_path.join("config"), config::DEFAULT_REPOSITORY_CONFIG)?;

        tracing::debug!(path = %path.display(), "created repository");
        Self::open(path, writer)
    }

    /// Locate the repository containing `start`, walking up to the filesystem root
    pub fn find(start: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let start = start
            .canonicalize()
            .with_context(|| format!("Unable to resolve {}", start.display()))?;

        let root = start
            .ancestors()
            .find(|dir| dir.join(GIT_DIR_NAME).is_dir())
            .ok_or_else(|| Error::NotARepository(start.clone()))?;

        Self::open(root, writer)
    }

    /// Open the repository whose worktree root is `path`
    pub fn open(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("Unable to resolve {}", path.display()))?;
        let git_path = path.join(GIT_DIR_NAME);
        if !git_path.is_dir() {
            return Err(Error::NotARepository(path).into());
        }

        let config = Config::load(&git_path.join("config"))?;
        config.check_format_version()?;

        Ok(Repository {
            database: Database::new(git_path.join("objects")),
            workspace: Workspace::new(path.into_boxed_path()),
            refs: Refs::new(git_path.clone().into_boxed_path()),
            git_path: git_path.into_boxed_path(),
            writer: RefCell::new(writer),
            config,
        })
    }

    /// Worktree root
    pub fn path(&self) -> &Path {
        self.workspace.path()
    }

    /// Metadata root (`.git`)
    pub fn git_path(&self) -> &Path {
        &self.git_path
    }

    pub fn index_path(&self) -> PathBuf {
        self.git_path.join("index")
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Read the index from disk; each command works on a fresh copy
    pub fn load_index(&self) -> anyhow::Result<Index> {
        Index::load(self.index_path())
    }
}
