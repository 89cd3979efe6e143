//! Core repository components
//!
//! This module contains the fundamental building blocks of a repository:
//!
//! - `database`: Object database for storing blobs, trees, and commits
//! - `index`: Staging area (index/cache) for tracking file changes
//! - `refs`: Reference management (branches, HEAD, tags)
//! - `repository`: High-level repository operations and coordination
//! - `workspace`: Working directory file system operations

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
