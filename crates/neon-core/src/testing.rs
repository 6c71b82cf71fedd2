//! In-memory collaborators shared by the core test modules.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use uuid::Uuid;

use neon_types::conversation::{Conversation, Modality, Turn};
use neon_types::error::RepositoryError;
use neon_types::generation::{GenerationError, ImageRequest, ImageResult, TextRequest};

use crate::conversation::repository::{ConversationRepository, TurnRepository};
use crate::generation::provider::GenerationProvider;

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Text(TextRequest),
    Image(ImageRequest),
}

/// Provider that replays queued results and records every request.
///
/// With an empty queue, text calls echo the prompt and image calls return
/// `https://img/{n}.png` where `n` counts image calls.
pub struct ScriptedProvider {
    texts: Mutex<VecDeque<Result<String, GenerationError>>>,
    images: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            texts: Mutex::new(VecDeque::new()),
            images: Mutex::new(VecDeque::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Every call takes one permit from `gate` before answering.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn push_text(&self, result: Result<String, GenerationError>) {
        self.texts.lock().unwrap().push_back(result);
    }

    pub fn push_image(&self, result: Result<String, GenerationError>) {
        self.images.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<ProviderCall>>> {
        self.calls.clone()
    }
}

impl GenerationProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_text(&self, request: &TextRequest) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push(ProviderCall::Text(request.clone()));
        let next = self.texts.lock().unwrap().pop_front();
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        next.unwrap_or_else(|| Ok(format!("echo: {}", request.prompt)))
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageResult, GenerationError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(ProviderCall::Image(request.clone()));
            calls
                .iter()
                .filter(|c| matches!(c, ProviderCall::Image(_)))
                .count()
        };
        let next = self.images.lock().unwrap().pop_front();
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        next.unwrap_or_else(|| Ok(format!("https://img/{n}.png")))
            .map(|url| ImageResult { url })
    }
}

#[derive(Default)]
struct StoreState {
    conversations: Vec<Conversation>,
    turns: Vec<Turn>,
}

/// Conversation and turn store kept in memory. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    fail_preview: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `update_preview` call fail with a query error.
    pub fn fail_preview_updates(&self) {
        self.fail_preview.store(true, Ordering::SeqCst);
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.state.lock().unwrap().turns.clone()
    }

    pub fn conversation(&self, id: &Uuid) -> Option<Conversation> {
        self.state
            .lock()
            .unwrap()
            .conversations
            .iter()
            .find(|c| c.id == *id)
            .cloned()
    }
}

impl ConversationRepository for InMemoryStore {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Conversation, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.conversations.iter().any(|c| c.id == conversation.id) {
            return Err(RepositoryError::Conflict(conversation.id.to_string()));
        }
        state.conversations.push(conversation.clone());
        Ok(conversation.clone())
    }

    async fn get_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self.conversation(conversation_id))
    }

    async fn list_conversations(
        &self,
        modality: Option<Modality>,
        limit: Option<i64>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut list: Vec<Conversation> = state
            .conversations
            .iter()
            .filter(|c| modality.is_none_or(|m| c.modality == m))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        if let Some(limit) = limit {
            list.truncate(limit.max(0) as usize);
        }
        Ok(list)
    }

    async fn count_conversations(&self, modality: Option<Modality>) -> Result<u64, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .conversations
            .iter()
            .filter(|c| modality.is_none_or(|m| c.modality == m))
            .count() as u64)
    }

    async fn update_preview(
        &self,
        conversation_id: &Uuid,
        preview: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if self.fail_preview.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("preview update failed".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        let conv = state
            .conversations
            .iter_mut()
            .find(|c| c.id == *conversation_id)
            .ok_or(RepositoryError::NotFound)?;
        conv.preview = preview.to_string();
        conv.updated_at = updated_at;
        Ok(())
    }

    async fn delete_conversation(&self, conversation_id: &Uuid) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let before = state.conversations.len();
        state.conversations.retain(|c| c.id != *conversation_id);
        if state.conversations.len() == before {
            return Err(RepositoryError::NotFound);
        }
        state.turns.retain(|t| t.conversation_id != *conversation_id);
        Ok(())
    }
}

impl TurnRepository for InMemoryStore {
    async fn create_turn(&self, turn: &Turn) -> Result<Turn, RepositoryError> {
        self.state.lock().unwrap().turns.push(turn.clone());
        Ok(turn.clone())
    }

    async fn list_turns(&self, conversation_id: &Uuid) -> Result<Vec<Turn>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut turns: Vec<Turn> = state
            .turns
            .iter()
            .filter(|t| t.conversation_id == *conversation_id)
            .cloned()
            .collect();
        turns.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(turns)
    }
}
