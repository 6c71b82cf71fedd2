//! Conversation engine and repository trait definitions for Neon.
//!
//! This crate holds the conversation context & dispatch logic and defines
//! the "ports" (repository and generation traits) that the infrastructure
//! layer implements. It depends only on `neon-types` -- never on
//! `neon-infra` or any database/IO crate.

pub mod conversation;
pub mod dispatch;
pub mod engine;
pub mod event;
pub mod generation;

#[cfg(test)]
pub(crate) mod testing;
