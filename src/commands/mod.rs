//! Git command implementations
//!
//! Each command is a `Repository` method writing its output to the
//! repository's writer, split the way git splits them:
//!
//! - `plumbing`: low-level access to objects and references (cat-file, hash-object, ...)
//! - `porcelain`: user-facing workflows (add, commit, status, ...)

pub mod plumbing;
pub mod porcelain;
