//! Turn reconciliation.
//!
//! [`ConversationEngine`] takes one user utterance through
//! `Idle -> PersistingUserTurn -> Dispatching -> PersistingAssistantTurn -> Idle`,
//! falling back to `Idle` with the user turn kept when dispatch fails.

pub mod busy;
pub mod error;
pub mod service;

pub use busy::{BusyGuard, BusySet};
pub use error::EngineError;
pub use service::ConversationEngine;
