//! OpenAI-backed agent.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::prompts::{system_prompt, user_payload};
use super::request::{ChatMode, ChatRequest};
use super::stream::normalize;
use super::traits::{Agent, ChunkStream};
use crate::config::ProviderSettings;
use crate::error::AgentError;
use crate::llm::{LlmBackend, LlmConfig, LlmProvider, PromptRequest, create_provider};

/// Agent backed by the OpenAI Responses API.
pub struct OpenAiAgent {
    provider: Arc<dyn LlmProvider>,
}

impl OpenAiAgent {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Build the agent from configured credentials.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, AgentError> {
        let api_key = settings.api_key.clone().ok_or_else(|| {
            AgentError::Configuration(
                "OpenAI not configured. Provide OPENAI_API_KEY via environment or .env."
                    .to_string(),
            )
        })?;
        let provider = create_provider(&LlmConfig {
            backend: LlmBackend::OpenAi,
            api_key,
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
        })
        .map_err(|e| AgentError::Configuration(e.to_string()))?;
        Ok(Self::new(provider))
    }

    /// Answers get a little room; edits stay close to the source text.
    fn temperature(mode: ChatMode) -> f64 {
        match mode {
            ChatMode::Ask => 0.2,
            ChatMode::Edit => 0.1,
        }
    }
}

#[async_trait]
impl Agent for OpenAiAgent {
    fn name(&self) -> &str {
        "openai"
    }

    async fn process_stream(&self, request: ChatRequest) -> Result<ChunkStream, AgentError> {
        debug!(
            model = self.provider.model_name(),
            mode = %request.mode,
            path = %request.path,
            "Starting OpenAI stream"
        );
        let prompt = PromptRequest::new(system_prompt(request.mode), user_payload(&request))
            .with_temperature(Self::temperature(request.mode));
        let deltas = self.provider.stream(prompt).await.map_err(|e| {
            AgentError::Execution(format!("OpenAI agent failed to start streaming response: {}", e))
        })?;
        Ok(normalize(deltas, request.mode, self.name()))
    }
}
