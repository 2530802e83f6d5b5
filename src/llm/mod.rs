//! LLM integration for md-assist.
//!
//! Supports:
//! - **OpenAI**: Responses API via rig-core, optional alternate base URL
//! - **Gemini**: Google Generative Language API via rig-core
//!
//! Uses the rig-core crate for HTTP transport and the `RigAdapter` to bridge
//! rig's streaming `CompletionModel` API to our `LlmProvider` trait.

pub mod provider;
mod rig_adapter;

pub use provider::{LlmProvider, PromptRequest, TextStream};
pub use rig_adapter::RigAdapter;

use std::fmt::Display;
use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;

use crate::error::LlmError;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
    Gemini,
}

impl LlmBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmBackend::OpenAi => "openai",
            LlmBackend::Gemini => "gemini",
        }
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub base_url: Option<String>,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::OpenAi => create_openai_provider(config),
        LlmBackend::Gemini => create_gemini_provider(config),
    }
}

fn client_error(backend: LlmBackend, e: impl Display) -> LlmError {
    LlmError::RequestFailed {
        provider: backend.as_str().to_string(),
        reason: format!("Failed to create client: {}", e),
    }
}

fn create_openai_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openai;

    let api_key = config.api_key.expose_secret();
    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        match config.base_url.as_deref() {
            Some(base_url) => openai::Client::builder()
                .api_key(api_key)
                .base_url(base_url)
                .build()
                .map_err(|e| client_error(config.backend, e))?,
            None => openai::Client::new(api_key).map_err(|e| client_error(config.backend, e))?,
        };

    let model = client.completion_model(&config.model);
    tracing::info!(
        base_url = config.base_url.as_deref().unwrap_or("default"),
        "Using OpenAI (model: {})",
        config.model
    );
    Ok(Arc::new(RigAdapter::new(
        model,
        config.backend.as_str(),
        &config.model,
    )))
}

fn create_gemini_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::gemini;

    let client: rig::client::Client<gemini::client::GeminiExt> =
        gemini::Client::new(config.api_key.expose_secret())
            .map_err(|e| client_error(config.backend, e))?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using Gemini (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(
        model,
        config.backend.as_str(),
        &config.model,
    )))
}
