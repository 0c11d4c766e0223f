//! A git-compatible content-addressable storage engine.
//!
//! - `areas`: the on-disk stores (object database, index, refs, workspace,
//!   config) and the `Repository` handle tying them together
//! - `artifacts`: objects, index entries and the algorithms over them
//! - `commands`: one `Repository` method per command-line verb
//! - `errors`: the typed error taxonomy

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
pub mod telemetry;
