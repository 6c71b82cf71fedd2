//! Server-Sent Events feed of conversation events.
//!
//! GET /api/v1/events?conversation_id= - Streams every [`ConversationEvent`]
//! (optionally for one conversation). The SSE event name is the event's
//! `type` tag; the data is the JSON-encoded event. A `lagged` event tells a
//! slow client that events were dropped and cached views should be reloaded.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use uuid::Uuid;

use neon_types::event::ConversationEvent;

use super::parse_uuid;
use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub conversation_id: Option<String>,
}

/// SSE event name for a conversation event; matches its serde `type` tag.
pub(crate) fn event_name(event: &ConversationEvent) -> &'static str {
    match event {
        ConversationEvent::ConversationCreated { .. } => "conversation_created",
        ConversationEvent::TurnPersisted { .. } => "turn_persisted",
        ConversationEvent::ConversationUpdated { .. } => "conversation_updated",
        ConversationEvent::DispatchFailed { .. } => "dispatch_failed",
        ConversationEvent::ConversationDeleted { .. } => "conversation_deleted",
    }
}

fn accepts(filter: Option<Uuid>, event: &ConversationEvent) -> bool {
    filter.is_none_or(|id| event.conversation_id() == id)
}

/// GET /api/v1/events
pub async fn stream_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let filter = query
        .conversation_id
        .as_deref()
        .map(parse_uuid)
        .transpose()?;

    let mut rx = state.events.subscribe();
    tracing::debug!(filter = ?filter, subscribers = state.events.receiver_count(), "SSE client subscribed");

    let sse_stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if !accepts(filter, &event) {
                        continue;
                    }
                    let data = match serde_json::to_string(&event) {
                        Ok(data) => data,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to encode conversation event");
                            continue;
                        }
                    };
                    yield Ok::<_, Infallible>(Event::default().event(event_name(&event)).data(data));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "SSE client lagged behind the event bus");
                    let data = serde_json::json!({ "skipped": skipped });
                    yield Ok(Event::default().event("lagged").data(data.to_string()));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
