//! Change notifications for conversation data.
//!
//! Views subscribe to the [`EventBus`] and refresh whatever a
//! `ConversationEvent` marks as stale.

pub mod bus;

pub use bus::EventBus;
