//! Agent trait shared by all provider implementations.

use std::pin::Pin;

use async_trait::async_trait;
use axum::body::Bytes;
use futures::{Stream, StreamExt};

use super::chunk::{ChatOutcome, StreamChunk};
use super::request::{ChatMode, ChatRequest};
use crate::error::AgentError;

/// Normalized chunk stream produced by an agent.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, AgentError>> + Send>>;

/// Newline-delimited JSON stream, one encoded chunk per item.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, AgentError>> + Send>>;

/// Strategy interface for LLM-backed agents.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Backend label used in logs ("openai", "gemini").
    fn name(&self) -> &str;

    /// Start the provider call and return the normalized chunk stream.
    ///
    /// An `Err` here means nothing was produced. Errors inside the stream
    /// mean the provider failed after starting; no final chunk follows them.
    async fn process_stream(&self, request: ChatRequest) -> Result<ChunkStream, AgentError>;

    /// Drain `process_stream` and return only the final text.
    async fn process(&self, request: ChatRequest) -> Result<ChatOutcome, AgentError> {
        let mode = request.mode;
        let mut stream = self.process_stream(request).await?;
        while let Some(chunk) = stream.next().await {
            if let StreamChunk::Final(text) = chunk? {
                return Ok(ChatOutcome::new(mode, text));
            }
        }
        Err(AgentError::Execution(format!(
            "{} agent stream ended without a final answer.",
            self.name()
        )))
    }
}

/// Encode a chunk stream as JSON lines keyed by `mode`.
pub fn encode_jsonl(chunks: ChunkStream, mode: ChatMode) -> ByteStream {
    Box::pin(chunks.map(move |chunk| chunk.map(|c| c.to_json_line(mode))))
}
