//! Event types for the Neon conversation event bus.
//!
//! `ConversationEvent` tells views which cached data went stale. All variants
//! are Clone + Send + Sync for use with tokio broadcast channels.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::{Modality, TurnRole};

/// Events emitted when conversation state changes.
///
/// Subscribers (CLI, SSE feed) use these to refresh conversation lists and
/// transcripts instead of polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    /// A conversation was created; the modality's list is stale.
    ConversationCreated {
        conversation_id: Uuid,
        modality: Modality,
    },

    /// A turn was appended; the conversation transcript is stale.
    TurnPersisted {
        conversation_id: Uuid,
        turn_id: Uuid,
        role: TurnRole,
    },

    /// Preview and timestamp changed; conversation lists are stale.
    ConversationUpdated {
        conversation_id: Uuid,
        preview: String,
    },

    /// A dispatch failed after the user turn was recorded.
    DispatchFailed {
        conversation_id: Uuid,
        user_turn_id: Uuid,
        error: String,
    },

    /// A conversation and its turns were removed.
    ConversationDeleted { conversation_id: Uuid },
}

impl ConversationEvent {
    /// The conversation this event concerns.
    pub fn conversation_id(&self) -> Uuid {
        match self {
            ConversationEvent::ConversationCreated {
                conversation_id, ..
            }
            | ConversationEvent::TurnPersisted {
                conversation_id, ..
            }
            | ConversationEvent::ConversationUpdated {
                conversation_id, ..
            }
            | ConversationEvent::DispatchFailed {
                conversation_id, ..
            }
            | ConversationEvent::ConversationDeleted { conversation_id } => *conversation_id,
        }
    }
}
