//! Core repository components
//!
//! This module contains the fundamental building blocks of a Git repository:
//!
//! - `config`: Git INI configuration and user-global settings
//! - `database`: Object database for storing blobs, trees, commits and tags
//! - `index`: Staging area (index/cache) for tracking file changes
//! - `refs`: Reference management (branches, HEAD, tags)
//! - `repository`: High-level repository operations and coordination
//! - `workspace`: Working directory file system operations

pub mod config;
pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
