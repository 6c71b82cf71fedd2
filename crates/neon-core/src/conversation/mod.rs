//! Conversation and turn persistence abstractions for Neon.
//!
//! This module defines the `ConversationRepository` and `TurnRepository`
//! traits that the infrastructure layer implements, plus the
//! modality-scoped `ConversationCatalog` built on top of them.

pub mod catalog;
pub mod repository;
