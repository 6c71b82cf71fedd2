//! Errors surfaced by [`ConversationEngine::submit`](super::ConversationEngine::submit).

use neon_types::error::RepositoryError;
use uuid::Uuid;

use crate::dispatch::DispatchError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Empty or whitespace-only utterance. Nothing was persisted.
    #[error("utterance is empty")]
    EmptyUtterance,

    #[error("conversation not found: {0}")]
    ConversationNotFound(Uuid),

    /// Another dispatch for this conversation is still running.
    #[error("conversation {0} already has a dispatch in flight")]
    Busy(Uuid),

    /// Dispatch failed. The user turn `user_turn_id` stays persisted.
    #[error("generation failed: {source}")]
    Generation {
        user_turn_id: Uuid,
        #[source]
        source: DispatchError,
    },

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl EngineError {
    /// Whether the conversation is still usable and the user may resubmit.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::Repository(_))
    }
}
