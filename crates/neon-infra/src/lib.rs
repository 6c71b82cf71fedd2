//! Infrastructure layer for Neon.
//!
//! Implements the collaborator traits defined in `neon-core`: SQLite
//! conversation storage, the HTTP generation provider, plus config loading
//! and data directory resolution.

pub mod config;
pub mod filesystem;
pub mod generation;
pub mod sqlite;
