//! Transcript and submission handlers.
//!
//! Endpoints:
//! - GET  /api/v1/conversations/{id}/turns - Transcript, oldest first
//! - POST /api/v1/conversations/{id}/turns - Submit an utterance
//! - GET  /api/v1/conversations/{id}/busy  - Whether a dispatch is in flight

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use neon_types::conversation::{Turn, TurnPair};

use super::{conversation_href, parse_uuid};
use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct BusyStatus {
    pub conversation_id: String,
    pub busy: bool,
}

/// GET /api/v1/conversations/{id}/turns
pub async fn list_turns(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<Turn>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_uuid(&id)?;

    let turns = state.engine.transcript(&id).await?;
    Ok(timer
        .finish(turns)
        .with_link("conversation", conversation_href(&id)))
}

/// POST /api/v1/conversations/{id}/turns
///
/// Blocks until the assistant turn is persisted. On generation failure the
/// user turn stays in the transcript and the response is 502.
///
/// The dispatch runs in its own task, so it completes (and publishes its
/// events) even if the client goes away before the response is written.
pub async fn submit_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SubmitRequest>,
) -> Result<ApiResponse<TurnPair>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_uuid(&id)?;

    let engine = state.engine.clone();
    let content = body.content;
    let pair = tokio::spawn(async move { engine.submit(id, &content).await })
        .await
        .map_err(|e| AppError::Internal(format!("dispatch task failed: {e}")))??;
    let href = conversation_href(&id);
    Ok(timer
        .finish(pair)
        .with_status(StatusCode::CREATED)
        .with_link("turns", format!("{href}/turns"))
        .with_link("conversation", href))
}

/// GET /api/v1/conversations/{id}/busy
pub async fn get_busy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<BusyStatus>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_uuid(&id)?;

    if state.catalog.get(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Conversation {id} not found")));
    }

    Ok(timer.finish(BusyStatus {
        conversation_id: id.to_string(),
        busy: state.engine.is_busy(&id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use std::time::Duration;

    use neon_types::conversation::{MediaRef, Modality, TurnRole};
    use neon_types::event::ConversationEvent;

    use crate::state::test_support::test_state;

    fn submit(text: &str) -> Json<SubmitRequest> {
        Json(SubmitRequest {
            content: text.to_string(),
        })
    }

    #[tokio::test]
    async fn submit_appends_pair_and_transcript_grows() {
        let (state, _dir) = test_state().await;
        let conv = state.catalog.create(Modality::Assistant, None).await.unwrap();
        let id = conv.id.to_string();

        let resp = submit_turn(State(state.clone()), Path(id.clone()), submit("Bonjour"))
            .await
            .unwrap();
        assert_eq!(resp.data.user.content, "Bonjour");
        assert_eq!(resp.data.assistant.role, TurnRole::Assistant);
        assert_eq!(resp.into_response().status(), StatusCode::CREATED);

        submit_turn(State(state.clone()), Path(id.clone()), submit("Encore"))
            .await
            .unwrap();

        let transcript = list_turns(State(state.clone()), Path(id)).await.unwrap();
        let roles: Vec<TurnRole> = transcript.data.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                TurnRole::User,
                TurnRole::Assistant,
                TurnRole::User,
                TurnRole::Assistant
            ]
        );

        let conv = state.catalog.get(&conv.id).await.unwrap().unwrap();
        assert_eq!(conv.preview, "Encore");
    }

    #[tokio::test]
    async fn video_submission_returns_frame_sequence() {
        let (state, _dir) = test_state().await;
        let conv = state.catalog.create(Modality::Video, None).await.unwrap();

        let resp = submit_turn(
            State(state),
            Path(conv.id.to_string()),
            submit("sunset over ocean"),
        )
        .await
        .unwrap();

        match resp.data.assistant.media {
            Some(MediaRef::Sequence { urls }) => assert_eq!(urls.len(), 4),
            other => panic!("unexpected media: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_utterance_is_400() {
        let (state, _dir) = test_state().await;
        let conv = state.catalog.create(Modality::Search, None).await.unwrap();

        let err = submit_turn(State(state.clone()), Path(conv.id.to_string()), submit("   "))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let transcript = list_turns(State(state), Path(conv.id.to_string()))
            .await
            .unwrap();
        assert!(transcript.data.is_empty());
    }

    #[tokio::test]
    async fn generation_failure_is_502_and_keeps_user_turn() {
        let (state, _dir) = test_state().await;
        let conv = state.catalog.create(Modality::Image, None).await.unwrap();

        let err = submit_turn(
            State(state.clone()),
            Path(conv.id.to_string()),
            submit("FAIL please"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);

        let transcript = list_turns(State(state), Path(conv.id.to_string()))
            .await
            .unwrap();
        assert_eq!(transcript.data.len(), 1);
        assert_eq!(transcript.data[0].role, TurnRole::User);
    }

    #[tokio::test]
    async fn unknown_conversation_is_404() {
        let (state, _dir) = test_state().await;
        let id = uuid::Uuid::now_v7().to_string();

        let err = submit_turn(State(state.clone()), Path(id.clone()), submit("hello"))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err = list_turns(State(state.clone()), Path(id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err = get_busy(State(state), Path(id)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn idle_conversation_is_not_busy() {
        let (state, _dir) = test_state().await;
        let conv = state.catalog.create(Modality::Assistant, None).await.unwrap();

        let status = get_busy(State(state), Path(conv.id.to_string()))
            .await
            .unwrap();
        assert!(!status.data.busy);
    }

    #[tokio::test]
    async fn dispatch_outlives_a_dropped_request() {
        let (state, _dir) = test_state().await;
        let conv = state.catalog.create(Modality::Assistant, None).await.unwrap();
        let mut rx = state.events.subscribe();

        // The client gives up long before the slow provider answers.
        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            submit_turn(
                State(state.clone()),
                Path(conv.id.to_string()),
                submit("Bonjour SLOW"),
            ),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(600)).await;

        let turns = state.engine.transcript(&conv.id).await.unwrap();
        let roles: Vec<TurnRole> = turns.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![TurnRole::User, TurnRole::Assistant]);
        assert!(!state.engine.is_busy(&conv.id));

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(crate::http::handlers::events::event_name(&event));
            if let ConversationEvent::ConversationUpdated { preview, .. } = &event {
                assert_eq!(preview, "Bonjour SLOW");
            }
        }
        assert_eq!(
            kinds,
            vec!["turn_persisted", "turn_persisted", "conversation_updated"]
        );
    }
}
