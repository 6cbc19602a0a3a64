//! Voxbridge server library logic.

pub mod api_chat;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use voxbridge_voice::VoicePipeline;

/// Maximum request body size (10 MiB). Protects against OOM from
/// oversized audio uploads.
const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across all request handlers.
///
/// Holds nothing mutable: the pipeline is read-only wiring around the
/// adapters, whose connection pools are safe for concurrent use.
pub struct AppState {
    /// The orchestration pipeline every chat request runs through.
    pub pipeline: VoicePipeline,
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Root handler pointing callers at the chat endpoint.
async fn root() -> Json<Value> {
    Json(json!({
        "message": "Voxbridge voice relay. POST audio to /api/chat to interact."
    }))
}

/// Builds the application router with all routes.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/chat", post(api_chat::chat_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
