//! HTTP surface: workspace file routes and the AI chat endpoints.

pub mod chat;
pub mod error;
pub mod files;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agents::AgentRegistry;
use crate::error::ConfigError;
use crate::workspace::WorkspaceStore;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<WorkspaceStore>,
    pub agents: Arc<AgentRegistry>,
}

impl AppState {
    pub fn new(workspace: WorkspaceStore, agents: AgentRegistry) -> Self {
        Self {
            workspace: Arc::new(workspace),
            agents: Arc::new(agents),
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// Build the API routes.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/files", get(files::list_files))
        .route("/api/file", get(files::get_file).put(files::put_file))
        .route("/api/ai/chat", post(chat::chat))
        .route("/api/ai/chat/sync", post(chat::chat_sync))
        .with_state(state)
}

/// API routes plus CORS for the UI origin and request tracing.
pub fn app(state: AppState, ui_origin: &str) -> Result<Router, ConfigError> {
    let origin = HeaderValue::from_str(ui_origin).map_err(|e| ConfigError::InvalidValue {
        key: "UI_ORIGIN".to_string(),
        message: e.to_string(),
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    Ok(api_routes(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}
