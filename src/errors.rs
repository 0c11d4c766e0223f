//! Error taxonomy of the storage engine
//!
//! Operations return `anyhow::Result` and raise these variants through
//! `anyhow::Error`, so callers can recover the kind with
//! `err.downcast_ref::<Error>()` while still getting context chains for
//! plain I/O failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("not a git repository (or any of the parent directories): {0}")]
    NotARepository(PathBuf),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("path {0} is outside repository worktree")]
    PathOutsideWorktree(PathBuf),

    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("pathspec '{0}' did not match any file known to the index")]
    NotInIndex(String),

    #[error("object {0} not found")]
    ObjectNotFound(String),

    #[error("object {oid} is corrupt: {reason}")]
    CorruptObject { oid: String, reason: String },

    #[error("unknown object type '{0}'")]
    UnknownObjectType(String),

    #[error("invalid object id '{0}'")]
    InvalidObjectId(String),

    #[error("no such reference '{0}'")]
    NoSuchReference(String),

    #[error("ambiguous reference '{name}': candidates are:\n - {}", candidates.join("\n - "))]
    AmbiguousReference {
        name: String,
        candidates: Vec<String>,
    },

    #[error("object {oid} is a {actual}, not a {expected}")]
    WrongObjectType {
        oid: String,
        expected: String,
        actual: String,
    },

    #[error("'{0}' is not a valid branch or tag name")]
    InvalidBranchName(String),

    #[error("unsupported index version {0}")]
    UnsupportedIndexVersion(u32),

    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    #[error("target directory {0} is not empty")]
    TargetNotEmpty(PathBuf),

    #[error("configuration file missing at {0}")]
    MissingConfig(PathBuf),

    #[error("unsupported repositoryformatversion {0}")]
    UnsupportedFormatVersion(u32),

    #[error("author identity unknown: set GIT_AUTHOR_NAME and GIT_AUTHOR_EMAIL or user.name and user.email")]
    MissingIdentity,
}

impl Error {
    pub fn corrupt_object(oid: impl ToString, reason: impl ToString) -> Self {
        Error::CorruptObject {
            oid: oid.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Recover the engine error kind from an `anyhow` chain, if there is one.
pub fn kind_of(err: &anyhow::Error) -> Option<&Error> {
    err.downcast_ref::<Error>()
        .or_else(|| err.chain().find_map(|cause| cause.downcast_ref::<Error>()))
}
