//! ConversationRepository and TurnRepository trait definitions.
//!
//! Conversations are the mutable side (preview and timestamp change); turns
//! are append-only, so `TurnRepository` exposes no update or delete.

use chrono::{DateTime, Utc};
use neon_types::conversation::{Conversation, Modality, Turn};
use neon_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for conversation persistence.
///
/// Implementations live in neon-infra (e.g., `SqliteConversationRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ConversationRepository: Send + Sync {
    /// Create a new conversation.
    fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Get a conversation by its unique ID.
    fn get_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// List conversations, optionally restricted to one modality, ordered by updated_at DESC.
    fn list_conversations(
        &self,
        modality: Option<Modality>,
        limit: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Count conversations, optionally restricted to one modality.
    fn count_conversations(
        &self,
        modality: Option<Modality>,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Replace the preview string and bump updated_at.
    ///
    /// Never touches the modality.
    fn update_preview(
        &self,
        conversation_id: &Uuid,
        preview: &str,
        updated_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a conversation and all of its turns.
    fn delete_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Repository trait for append-only turn persistence.
pub trait TurnRepository: Send + Sync {
    /// Append a turn to its conversation.
    fn create_turn(
        &self,
        turn: &Turn,
    ) -> impl std::future::Future<Output = Result<Turn, RepositoryError>> + Send;

    /// Get all turns of a conversation, ordered by created_at ASC.
    fn list_turns(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;
}
