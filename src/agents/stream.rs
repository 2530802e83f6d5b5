//! Normalization of raw provider text streams into `StreamChunk`s.
//!
//! Every provider adapter funnels its text fragments through [`normalize`],
//! which forwards each fragment as a delta in arrival order, accumulates the
//! text, and emits exactly one final chunk once the provider stream ends.
//! The final text is always derived from the accumulated deltas.

use futures::StreamExt;
use futures::stream;
use tracing::{debug, info, warn};

use super::chunk::StreamChunk;
use super::markdown::extract_markdown;
use super::request::ChatMode;
use super::traits::ChunkStream;
use crate::error::AgentError;
use crate::llm::TextStream;

/// Turn accumulated delta text into the final answer for `mode`.
///
/// Ask mode trims the text; edit mode extracts the first fenced block.
/// An empty result is an execution error.
pub fn finalize_text(agent: &str, collected: &str, mode: ChatMode) -> Result<String, AgentError> {
    let text = match mode {
        ChatMode::Ask => collected.trim().to_string(),
        ChatMode::Edit => extract_markdown(collected),
    };
    if text.is_empty() {
        let what = match mode {
            ChatMode::Ask => "response",
            ChatMode::Edit => "edit",
        };
        return Err(AgentError::Execution(format!(
            "{} agent returned an empty {}.",
            agent, what
        )));
    }
    Ok(text)
}

struct NormalizeState {
    deltas: TextStream,
    collected: String,
    delta_count: usize,
    mode: ChatMode,
    agent: String,
    done: bool,
}

impl Drop for NormalizeState {
    fn drop(&mut self) {
        if !self.done {
            debug!(
                agent = %self.agent,
                deltas = self.delta_count,
                "Stream dropped before completion, abandoning provider call"
            );
        }
    }
}

/// Wrap a provider text stream in the delta/final chunk protocol.
///
/// Dropping the returned stream drops the provider stream with it.
pub fn normalize(deltas: TextStream, mode: ChatMode, agent: &str) -> ChunkStream {
    let state = NormalizeState {
        deltas,
        collected: String::new(),
        delta_count: 0,
        mode,
        agent: agent.to_string(),
        done: false,
    };

    Box::pin(stream::try_unfold(state, |mut state| async move {
        if state.done {
            return Ok(None);
        }
        loop {
            match state.deltas.next().await {
                Some(Ok(text)) => {
                    if text.is_empty() {
                        continue;
                    }
                    state.collected.push_str(&text);
                    state.delta_count += 1;
                    return Ok(Some((StreamChunk::Delta(text), state)));
                }
                Some(Err(e)) => {
                    state.done = true;
                    warn!(
                        agent = %state.agent,
                        deltas = state.delta_count,
                        error = %e,
                        "Provider stream failed"
                    );
                    return Err(AgentError::Execution(format!(
                        "{} agent failed while streaming: {}",
                        state.agent, e
                    )));
                }
                None => {
                    state.done = true;
                    let text = finalize_text(&state.agent, &state.collected, state.mode)?;
                    info!(
                        agent = %state.agent,
                        mode = %state.mode,
                        deltas = state.delta_count,
                        chars = text.len(),
                        "Agent stream completed"
                    );
                    return Ok(Some((StreamChunk::Final(text), state)));
                }
            }
        }
    }))
}
