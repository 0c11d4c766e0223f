//! Commit history traversal
//!
//! The walk uses a priority queue ordered by committer timestamp, so merge
//! histories come out newest first with every commit listed once.

pub mod rev_list;
