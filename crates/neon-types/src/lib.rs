//! Shared domain types for Neon.
//!
//! This crate contains the core domain types used across the Neon workspace:
//! conversations, turns, media references, generation requests, engine
//! events, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod generation;
