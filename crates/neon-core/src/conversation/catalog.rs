//! Modality-scoped conversation catalog.
//!
//! One catalog serves every modality: listing, creation with a numbered
//! default title, selection with fallback to the most recent conversation,
//! deletion, and the per-modality counts shown on the hub.

use neon_types::conversation::{Conversation, Modality, ModalityCount};
use neon_types::error::RepositoryError;
use neon_types::event::ConversationEvent;
use tracing::{debug, info};
use uuid::Uuid;

use crate::event::EventBus;

use super::repository::ConversationRepository;

pub struct ConversationCatalog<C: ConversationRepository> {
    repo: C,
    events: EventBus,
}

impl<C: ConversationRepository> ConversationCatalog<C> {
    pub fn new(repo: C, events: EventBus) -> Self {
        Self { repo, events }
    }

    /// Conversations of `modality` (or all), most recently updated first.
    pub async fn list(
        &self,
        modality: Option<Modality>,
        limit: Option<i64>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        self.repo.list_conversations(modality, limit).await
    }

    pub async fn get(&self, conversation_id: &Uuid) -> Result<Option<Conversation>, RepositoryError> {
        self.repo.get_conversation(conversation_id).await
    }

    /// Create a conversation. A missing or blank title becomes the
    /// modality's numbered default, e.g. "Recherche 3".
    pub async fn create(
        &self,
        modality: Modality,
        title: Option<String>,
    ) -> Result<Conversation, RepositoryError> {
        let title = match title.map(|t| t.trim().to_string()) {
            Some(t) if !t.is_empty() => t,
            _ => {
                let existing = self.repo.count_conversations(Some(modality)).await?;
                modality.default_title(existing + 1)
            }
        };

        let conversation = self
            .repo
            .create_conversation(&Conversation::new(title, modality))
            .await?;

        info!(
            conversation_id = %conversation.id,
            modality = %modality,
            title = %conversation.title,
            "Conversation created"
        );
        self.events.publish(ConversationEvent::ConversationCreated {
            conversation_id: conversation.id,
            modality,
        });
        Ok(conversation)
    }

    /// Resolve the conversation a view should show.
    ///
    /// `selected` wins when it exists and belongs to `modality`; otherwise
    /// the most recently updated conversation of that modality is used.
    /// Returns `None` when the modality has no conversation yet.
    pub async fn select_or_default(
        &self,
        modality: Modality,
        selected: Option<Uuid>,
    ) -> Result<Option<Conversation>, RepositoryError> {
        if let Some(id) = selected {
            match self.repo.get_conversation(&id).await? {
                Some(conversation) if conversation.modality == modality => {
                    return Ok(Some(conversation));
                }
                Some(conversation) => {
                    debug!(
                        conversation_id = %id,
                        expected = %modality,
                        actual = %conversation.modality,
                        "Selected conversation has another modality, falling back"
                    );
                }
                None => {
                    debug!(conversation_id = %id, "Selected conversation missing, falling back");
                }
            }
        }

        let mut latest = self.repo.list_conversations(Some(modality), Some(1)).await?;
        Ok(latest.pop())
    }

    /// Like [`select_or_default`](Self::select_or_default), creating a
    /// conversation with the default title when the modality has none.
    pub async fn open(
        &self,
        modality: Modality,
        selected: Option<Uuid>,
    ) -> Result<Conversation, RepositoryError> {
        match self.select_or_default(modality, selected).await? {
            Some(conversation) => Ok(conversation),
            None => self.create(modality, None).await,
        }
    }

    /// Delete a conversation and its turns.
    pub async fn delete(&self, conversation_id: &Uuid) -> Result<(), RepositoryError> {
        self.repo.delete_conversation(conversation_id).await?;
        info!(conversation_id = %conversation_id, "Conversation deleted");
        self.events.publish(ConversationEvent::ConversationDeleted {
            conversation_id: *conversation_id,
        });
        Ok(())
    }

    /// Conversation count for every modality, in hub order.
    pub async fn stats(&self) -> Result<Vec<ModalityCount>, RepositoryError> {
        let mut counts = Vec::with_capacity(Modality::ALL.len());
        for modality in Modality::ALL {
            counts.push(ModalityCount {
                modality,
                conversations: self.repo.count_conversations(Some(modality)).await?,
            });
        }
        Ok(counts)
    }
}
