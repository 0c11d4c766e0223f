//! Git data structures and algorithms
//!
//! - `branch`: branch names and name resolution
//! - `checkout`: materialising trees into directories
//! - `index`: index entry encoding
//! - `log`: commit history traversal
//! - `objects`: object kinds, KVLM and the tree builder
//! - `status`: working tree status and ignore rules

pub mod branch;
pub mod checkout;
pub mod index;
pub mod log;
pub mod objects;
pub mod status;
