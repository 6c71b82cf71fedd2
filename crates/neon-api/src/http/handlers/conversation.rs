//! Conversation catalog handlers.
//!
//! Endpoints:
//! - GET    /api/v1/conversations?modality=&limit=  - List, newest first
//! - POST   /api/v1/conversations                   - Create
//! - GET    /api/v1/conversations/{id}              - Get one
//! - DELETE /api/v1/conversations/{id}              - Delete with its turns
//! - POST   /api/v1/modalities/{modality}/open?selected=  - Select or create

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use neon_types::conversation::Conversation;

use super::{conversation_href, parse_modality, parse_uuid};
use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub modality: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub modality: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenQuery {
    /// Conversation the client last had selected, if any.
    #[serde(default)]
    pub selected: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
    pub id: String,
}

/// GET /api/v1/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<Vec<Conversation>>, AppError> {
    let timer = RequestTimer::start();

    let modality = query.modality.as_deref().map(parse_modality).transpose()?;
    if matches!(query.limit, Some(n) if n < 1) {
        return Err(AppError::Validation("limit must be positive".to_string()));
    }

    let conversations = state.catalog.list(modality, query.limit).await?;
    Ok(timer
        .finish(conversations)
        .with_link("self", "/api/v1/conversations"))
}

/// POST /api/v1/conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    Json(body): Json<CreateConversationRequest>,
) -> Result<ApiResponse<Conversation>, AppError> {
    let timer = RequestTimer::start();
    let modality = parse_modality(&body.modality)?;

    let conversation = state.catalog.create(modality, body.title).await?;
    let href = conversation_href(&conversation.id);
    Ok(timer
        .finish(conversation)
        .with_status(StatusCode::CREATED)
        .with_link("turns", format!("{href}/turns"))
        .with_link("self", href))
}

/// GET /api/v1/conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Conversation>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_uuid(&id)?;

    let conversation = state
        .catalog
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Conversation {id} not found")))?;

    let href = conversation_href(&id);
    Ok(timer
        .finish(conversation)
        .with_link("turns", format!("{href}/turns"))
        .with_link("self", href))
}

/// DELETE /api/v1/conversations/{id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<DeletedResponse>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_uuid(&id)?;

    state.catalog.delete(&id).await?;
    Ok(timer.finish(DeletedResponse {
        deleted: true,
        id: id.to_string(),
    }))
}

/// POST /api/v1/modalities/{modality}/open
///
/// Resolves the conversation a modality view should show, creating the
/// first one when the modality is empty.
pub async fn open_modality(
    State(state): State<AppState>,
    Path(modality): Path<String>,
    Query(query): Query<OpenQuery>,
) -> Result<ApiResponse<Conversation>, AppError> {
    let timer = RequestTimer::start();
    let modality = parse_modality(&modality)?;
    let selected = query
        .selected
        .as_deref()
        .map(parse_uuid)
        .transpose()?;

    let conversation = state.catalog.open(modality, selected).await?;
    let href = conversation_href(&conversation.id);
    Ok(timer.finish(conversation).with_link("self", href))
}
