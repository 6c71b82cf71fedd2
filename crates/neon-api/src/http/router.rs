//! Axum router configuration with middleware.
//!
//! All resource routes are under `/api/v1/`; `/health` sits at the root.
//! Middleware: CORS (any origin) and request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/conversations",
            get(handlers::conversation::list_conversations)
                .post(handlers::conversation::create_conversation),
        )
        .route(
            "/conversations/{id}",
            get(handlers::conversation::get_conversation)
                .delete(handlers::conversation::delete_conversation),
        )
        .route(
            "/conversations/{id}/turns",
            get(handlers::turn::list_turns).post(handlers::turn::submit_turn),
        )
        .route("/conversations/{id}/busy", get(handlers::turn::get_busy))
        .route(
            "/modalities/{modality}/open",
            post(handlers::conversation::open_modality),
        )
        .route("/stats", get(handlers::stats::get_stats))
        .route("/events", get(handlers::events::stream_events));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
