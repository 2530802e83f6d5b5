//! Mapping of service errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::agents::InvalidMode;
use crate::error::{AgentError, WorkspaceError};

/// Error returned by HTTP handlers. Rendered as `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    InvalidMode(#[from] InvalidMode),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Workspace(WorkspaceError::InvalidPath(_)) => StatusCode::BAD_REQUEST,
            ApiError::Workspace(WorkspaceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Workspace(WorkspaceError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Agent(AgentError::NotFound { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Agent(AgentError::Configuration(_) | AgentError::Execution(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::InvalidMode(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %detail, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %detail, "Request rejected");
        }
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
