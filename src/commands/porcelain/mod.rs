//! Porcelain commands (user-facing Git operations)
//!
//! They compose the stores and algorithms into everyday workflows:
//!
//! - `init`: create a repository
//! - `add` / `rm`: stage and unstage files
//! - `commit`: record the index as a commit
//! - `status`: show staged, unstaged and untracked changes
//! - `checkout`: write a tree into an empty directory
//! - `tag` / `branch`: create and list references
//! - `log`: show commit history

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod rm;
pub mod status;
pub mod tag;
