//! HTTP surface: welcome, health and on-demand nudge runs.

use std::sync::Arc;

use axum::extract::State;
use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::data::DataSource;
use crate::pipeline::processor::NudgeProcessor;

/// Shared state for the API routes.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<NudgeProcessor>,
    pub source: Arc<dyn DataSource>,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/nudges", get(list_nudges))
        .layer(cors)
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the Mini Nudge Agent API!"
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /nudges
///
/// Runs the pipeline against the configured source at the current time.
async fn list_nudges(State(state): State<AppState>) -> impl IntoResponse {
    let nudges = state
        .processor
        .process(state.source.as_ref(), Utc::now())
        .await;
    info!(count = nudges.len(), "Served nudges");
    Json(nudges)
}
