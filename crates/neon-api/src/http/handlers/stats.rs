//! Hub statistics endpoint.
//!
//! GET /api/v1/stats - Conversation count per modality.

use axum::extract::State;
use serde::Serialize;

use neon_types::conversation::ModalityCount;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HubStats {
    pub modalities: Vec<HubEntry>,
    pub total_conversations: u64,
    /// Dispatches currently running across all conversations.
    pub in_flight: usize,
}

#[derive(Debug, Serialize)]
pub struct HubEntry {
    #[serde(flatten)]
    pub count: ModalityCount,
    pub label: &'static str,
}

/// GET /api/v1/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<ApiResponse<HubStats>, AppError> {
    let timer = RequestTimer::start();

    let counts = state.catalog.stats().await?;
    let total_conversations: u64 = counts.iter().map(|c| c.conversations).sum();
    let modalities = counts
        .into_iter()
        .map(|count| HubEntry {
            label: count.modality.label(),
            count,
        })
        .collect();

    Ok(timer.finish(HubStats {
        modalities,
        total_conversations,
        in_flight: state.engine.in_flight(),
    }))
}
