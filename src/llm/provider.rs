//! Provider-agnostic streaming completion interface.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::LlmError;

/// Incremental text fragments in arrival order.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// A single-turn prompt: system instruction plus one user message.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub preamble: String,
    pub prompt: String,
    /// `None` leaves the provider default in place.
    pub temperature: Option<f64>,
}

impl PromptRequest {
    pub fn new(preamble: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            prompt: prompt.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A streaming LLM backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name used in logs and errors ("openai", "gemini").
    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;

    /// Open a completion stream. Errors here mean the stream never started.
    async fn stream(&self, request: PromptRequest) -> Result<TextStream, LlmError>;
}
