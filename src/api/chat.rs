//! AI chat endpoints.

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, TryStreamExt, stream};
use serde::Deserialize;
use tracing::{error, info};

use super::AppState;
use super::error::ApiError;
use crate::agents::{ChatMode, ChatOutcome, ChatRequest, DEFAULT_AGENT_ID};
use crate::error::AgentError;

/// Media type of the streaming chat response.
pub const JSONL_CONTENT_TYPE: &str = "application/jsonl";

/// Chat request body. `content` is never accepted from the client.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub path: String,
    pub mode: String,
    pub message: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub selection: Option<String>,
}

/// Load the file, validate the mode and assemble the agent request.
///
/// File-store checks run first so no provider is ever called for a bad path.
async fn build_request(state: &AppState, body: ChatBody) -> Result<ChatRequest, ApiError> {
    let content = state.workspace.read(&body.path).await?;
    let mode: ChatMode = body.mode.parse()?;
    let agent_id = body
        .agent_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_AGENT_ID.to_string());

    Ok(ChatRequest::new(body.path, content, body.message, mode)
        .with_agent(agent_id)
        .with_selection(body.selection))
}

/// POST /api/ai/chat
///
/// Streams newline-delimited JSON chunks. The first chunk is pulled before
/// the response is committed, so start-up failures and empty answers become
/// regular error responses. A failure after that aborts the body.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Response, ApiError> {
    let request = build_request(&state, body).await?;
    info!(
        path = %request.path,
        mode = %request.mode,
        agent_id = %request.agent_id,
        "Chat request"
    );

    let mut lines = state.agents.route(request).await?;
    let first = match lines.next().await {
        Some(line) => line?,
        None => {
            return Err(AgentError::Execution("Agent produced no output.".to_string()).into());
        }
    };

    let lines = stream::once(async move { Ok::<_, AgentError>(first) })
        .chain(lines)
        .inspect_err(|e| error!(error = %e, "Chat stream aborted"));

    Ok((
        [(header::CONTENT_TYPE, JSONL_CONTENT_TYPE)],
        Body::from_stream(lines),
    )
        .into_response())
}

/// POST /api/ai/chat/sync
///
/// Non-streaming variant returning `{"answer"}` or `{"proposedContent"}`.
pub async fn chat_sync(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatOutcome>, ApiError> {
    let request = build_request(&state, body).await?;
    let agent = state.agents.resolve(&request.agent_id)?;
    Ok(Json(agent.process(request).await?))
}
