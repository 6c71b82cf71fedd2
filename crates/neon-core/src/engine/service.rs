//! Conversation engine: one user utterance in, one persisted turn pair out.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use neon_types::conversation::{Turn, TurnPair, preview_of};
use neon_types::event::ConversationEvent;

use crate::conversation::repository::{ConversationRepository, TurnRepository};
use crate::dispatch::GenerationStrategy;
use crate::event::EventBus;
use crate::generation::box_provider::BoxGenerationProvider;

use super::busy::BusySet;
use super::error::EngineError;

/// Reconciles user utterances into persisted conversation state.
///
/// Generic over the two store traits so neon-core never depends on
/// neon-infra. At most one dispatch per conversation runs at a time;
/// different conversations dispatch independently.
pub struct ConversationEngine<C: ConversationRepository, T: TurnRepository> {
    conversations: C,
    turns: T,
    provider: Arc<BoxGenerationProvider>,
    events: EventBus,
    busy: BusySet,
}

impl<C: ConversationRepository, T: TurnRepository> ConversationEngine<C, T> {
    pub fn new(
        conversations: C,
        turns: T,
        provider: Arc<BoxGenerationProvider>,
        events: EventBus,
    ) -> Self {
        Self {
            conversations,
            turns,
            provider,
            events,
            busy: BusySet::new(),
        }
    }

    /// True while a dispatch for `conversation_id` is outstanding.
    pub fn is_busy(&self, conversation_id: &Uuid) -> bool {
        self.busy.is_busy(conversation_id)
    }

    /// Number of conversations currently dispatching.
    pub fn in_flight(&self) -> usize {
        self.busy.len()
    }

    /// Full transcript of a conversation, oldest first.
    pub async fn transcript(&self, conversation_id: &Uuid) -> Result<Vec<Turn>, EngineError> {
        if self
            .conversations
            .get_conversation(conversation_id)
            .await?
            .is_none()
        {
            return Err(EngineError::ConversationNotFound(*conversation_id));
        }
        Ok(self.turns.list_turns(conversation_id).await?)
    }

    /// Submit a user utterance to a conversation.
    ///
    /// The user turn is persisted before dispatch, so it survives a failed
    /// generation. On success the assistant turn is persisted and the
    /// conversation preview is replaced by the start of the utterance.
    /// A failed preview refresh does not undo the pair: it is logged, no
    /// `ConversationUpdated` is published, and the pair is returned.
    /// Every call appends new turns; nothing is deduplicated.
    pub async fn submit(
        &self,
        conversation_id: Uuid,
        utterance: &str,
    ) -> Result<TurnPair, EngineError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            debug!(conversation_id = %conversation_id, "Ignoring empty utterance");
            return Err(EngineError::EmptyUtterance);
        }

        let conversation = self
            .conversations
            .get_conversation(&conversation_id)
            .await?
            .ok_or(EngineError::ConversationNotFound(conversation_id))?;

        let _guard = self
            .busy
            .try_acquire(conversation_id)
            .ok_or(EngineError::Busy(conversation_id))?;

        let strategy = GenerationStrategy::for_modality(conversation.modality);

        // Snapshot taken before the new turn lands; later arrivals are not
        // part of this dispatch.
        let history = if strategy.history_window() > 0 {
            self.turns.list_turns(&conversation_id).await?
        } else {
            Vec::new()
        };

        debug!(
            conversation_id = %conversation_id,
            modality = %conversation.modality,
            history_len = history.len(),
            "Persisting user turn"
        );
        let user_turn = self
            .turns
            .create_turn(&Turn::user(conversation_id, utterance.to_string()))
            .await?;
        self.publish_turn(&user_turn);

        debug!(conversation_id = %conversation_id, strategy = ?strategy, "Dispatching");
        let outcome = match strategy
            .dispatch(&self.provider, &history, utterance)
            .await
        {
            Ok(outcome) => outcome,
            Err(source) => {
                warn!(
                    conversation_id = %conversation_id,
                    user_turn_id = %user_turn.id,
                    error = %source,
                    "Dispatch failed, user turn kept"
                );
                self.events.publish(ConversationEvent::DispatchFailed {
                    conversation_id,
                    user_turn_id: user_turn.id,
                    error: source.to_string(),
                });
                return Err(EngineError::Generation {
                    user_turn_id: user_turn.id,
                    source,
                });
            }
        };

        let assistant_turn = self
            .turns
            .create_turn(&Turn::assistant(
                conversation_id,
                outcome.content,
                outcome.media,
            ))
            .await?;
        self.publish_turn(&assistant_turn);

        // The pair is committed at this point. The preview is derived data,
        // so a failed refresh is logged and the pair is still returned.
        let preview = preview_of(utterance);
        match self
            .conversations
            .update_preview(&conversation_id, &preview, Utc::now())
            .await
        {
            Ok(()) => {
                self.events.publish(ConversationEvent::ConversationUpdated {
                    conversation_id,
                    preview,
                });
            }
            Err(e) => {
                warn!(
                    conversation_id = %conversation_id,
                    assistant_turn_id = %assistant_turn.id,
                    error = %e,
                    "Preview update failed, turn pair kept"
                );
            }
        }

        info!(
            conversation_id = %conversation_id,
            modality = %conversation.modality,
            user_turn_id = %user_turn.id,
            assistant_turn_id = %assistant_turn.id,
            "Turn pair persisted"
        );

        Ok(TurnPair {
            user: user_turn,
            assistant: assistant_turn,
        })
    }

    fn publish_turn(&self, turn: &Turn) {
        self.events.publish(ConversationEvent::TurnPersisted {
            conversation_id: turn.conversation_id,
            turn_id: turn.id,
            role: turn.role,
        });
    }
}

impl<C: ConversationRepository, T: TurnRepository> std::fmt::Debug for ConversationEngine<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationEngine")
            .field("provider", &self.provider.name())
            .field("in_flight", &self.busy.len())
            .finish()
    }
}
