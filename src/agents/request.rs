//! Chat request passed to agent implementations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Agent used when the caller does not name one.
pub const DEFAULT_AGENT_ID: &str = "openai-qa";

/// Operation mode. Selects the prompts and the final-chunk post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Answer a question about the document.
    Ask,
    /// Propose a complete rewritten document.
    Edit,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Ask => "ask",
            ChatMode::Edit => "edit",
        }
    }

    /// JSON key carrying the final text for this mode.
    pub fn final_key(&self) -> &'static str {
        match self {
            ChatMode::Ask => "answer",
            ChatMode::Edit => "proposedContent",
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected mode string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid mode")]
pub struct InvalidMode(pub String);

impl FromStr for ChatMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ask" => Ok(ChatMode::Ask),
            "edit" => Ok(ChatMode::Edit),
            other => Err(InvalidMode(other.to_string())),
        }
    }
}

/// Unified request handed to an agent.
///
/// `content` is always loaded from the workspace store by the caller, never
/// taken from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub path: String,
    pub content: String,
    pub message: String,
    pub mode: ChatMode,
    pub agent_id: String,
    pub selection: Option<String>,
}

impl ChatRequest {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        message: impl Into<String>,
        mode: ChatMode,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            message: message.into(),
            mode,
            agent_id: DEFAULT_AGENT_ID.to_string(),
            selection: None,
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    /// Attach the selected excerpt. Blank selections are ignored.
    pub fn with_selection(mut self, selection: Option<String>) -> Self {
        self.selection = selection.filter(|s| !s.trim().is_empty());
        self
    }
}
