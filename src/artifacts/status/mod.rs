//! Working tree status
//!
//! Compares the HEAD tree with the index ("changes to be committed") and the
//! index with the working tree ("changes not staged"), then lists untracked
//! files that no ignore rule hides.

pub mod file_change;
pub mod ignore;
pub mod status_info;
