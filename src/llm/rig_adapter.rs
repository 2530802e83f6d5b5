//! Bridge from rig's `CompletionModel` streaming API to our `LlmProvider` trait.

use async_trait::async_trait;
use futures::StreamExt;
use rig::completion::CompletionModel;
use rig::streaming::StreamedAssistantContent;

use crate::error::LlmError;
use crate::llm::provider::{LlmProvider, PromptRequest, TextStream};

/// Adapter wrapping any rig completion model.
///
/// Only text deltas are forwarded. Reasoning, tool-call and final-response
/// items of the rig stream are dropped.
pub struct RigAdapter<M> {
    model: M,
    provider: String,
    model_name: String,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, provider: &str, model_name: &str) -> Self {
        Self {
            model,
            provider: provider.to_string(),
            model_name: model_name.to_string(),
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
    M::StreamingResponse: Send + 'static,
{
    fn provider_name(&self) -> &str {
        &self.provider
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn stream(&self, request: PromptRequest) -> Result<TextStream, LlmError> {
        let mut builder = self
            .model
            .completion_request(request.prompt)
            .preamble(request.preamble);
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(temperature);
        }

        let response = builder.stream().await.map_err(|e| LlmError::RequestFailed {
            provider: self.provider.clone(),
            reason: e.to_string(),
        })?;

        let provider = self.provider.clone();
        let stream = response.filter_map(move |item| {
            let provider = provider.clone();
            async move {
                match item {
                    Ok(StreamedAssistantContent::Text(text)) => Some(Ok(text.text)),
                    Ok(_) => None,
                    Err(e) => Some(Err(LlmError::Stream {
                        provider,
                        reason: e.to_string(),
                    })),
                }
            }
        });
        Ok(Box::pin(stream))
    }
}
