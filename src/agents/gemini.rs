//! Google Gemini-backed agent.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::prompts::{system_prompt, user_payload};
use super::request::ChatRequest;
use super::stream::normalize;
use super::traits::{Agent, ChunkStream};
use crate::config::{GOOGLE_KEY_VARS, ProviderSettings};
use crate::error::AgentError;
use crate::llm::{LlmBackend, LlmConfig, LlmProvider, PromptRequest, create_provider};

/// Agent backed by Google's Generative Language API. Uses the model's
/// default sampling settings.
pub struct GeminiAgent {
    provider: Arc<dyn LlmProvider>,
}

impl GeminiAgent {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, AgentError> {
        let api_key = settings.api_key.clone().ok_or_else(|| {
            AgentError::Configuration(format!(
                "Google Gemini not configured. Provide {} via environment or .env.",
                GOOGLE_KEY_VARS.join(", ")
            ))
        })?;
        let provider = create_provider(&LlmConfig {
            backend: LlmBackend::Gemini,
            api_key,
            model: settings.model.clone(),
            base_url: None,
        })
        .map_err(|e| AgentError::Configuration(e.to_string()))?;
        Ok(Self::new(provider))
    }
}

#[async_trait]
impl Agent for GeminiAgent {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn process_stream(&self, request: ChatRequest) -> Result<ChunkStream, AgentError> {
        debug!(
            model = self.provider.model_name(),
            mode = %request.mode,
            path = %request.path,
            "Starting Gemini stream"
        );
        let prompt = PromptRequest::new(system_prompt(request.mode), user_payload(&request));
        let deltas = self.provider.stream(prompt).await.map_err(|e| {
            AgentError::Execution(format!("Gemini agent failed to start streaming response: {}", e))
        })?;
        Ok(normalize(deltas, request.mode, self.name()))
    }
}
