//! Error types for md-assist.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Workspace store errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// The path escapes the workspace root or is otherwise unusable.
    #[error("{0}")]
    InvalidPath(String),

    #[error("{0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} stream failed: {reason}")]
    Stream { provider: String, reason: String },
}

/// Agent selection and execution errors.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Missing or invalid credentials. Raised before any work begins.
    #[error("{0}")]
    Configuration(String),

    #[error("Unknown agent_id '{agent_id}'. Available agents: {available:?}")]
    NotFound {
        agent_id: String,
        available: Vec<String>,
    },

    /// The provider call failed or produced unusable output.
    #[error("{0}")]
    Execution(String),
}

impl From<LlmError> for AgentError {
    fn from(err: LlmError) -> Self {
        AgentError::Execution(err.to_string())
    }
}
