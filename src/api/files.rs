//! Workspace file endpoints.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use serde::Deserialize;

use super::AppState;
use super::error::ApiError;
use crate::workspace::{WorkspaceEntry, WorkspaceFile};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    path: String,
}

#[derive(Debug, Deserialize)]
struct UpdateFileBody {
    content: String,
}

/// GET /api/files?path=<rel>
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<WorkspaceEntry>>, ApiError> {
    Ok(Json(state.workspace.list(&query.path).await?))
}

/// GET /api/file?path=<rel>
pub async fn get_file(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Json<WorkspaceFile>, ApiError> {
    Ok(Json(state.workspace.read_file(&query.path).await?))
}

/// PUT /api/file?path=<rel> with `{"content": "..."}`.
///
/// A missing body writes an empty file.
pub async fn put_file(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let content = if body.iter().all(u8::is_ascii_whitespace) {
        String::new()
    } else {
        serde_json::from_slice::<UpdateFileBody>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?
            .content
    };
    state.workspace.write(&query.path, &content).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
