//! Plumbing commands (low-level Git operations)
//!
//! Direct access to objects and references, mostly useful for scripting:
//!
//! - `cat-file`: print an object's payload
//! - `hash-object`: compute an object id and optionally store the object
//! - `ls-tree`: list the entries of a tree
//! - `rev-parse`: resolve a name to an object id
//! - `show-ref`: list references

pub mod cat_file;
pub mod hash_object;
pub mod ls_tree;
pub mod rev_parse;
pub mod show_ref;
