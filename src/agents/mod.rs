//! Agents: provider-backed strategies that turn a chat request into a
//! normalized delta/final chunk stream.
//!
//! ```text
//! ChatRequest ─▶ AgentRegistry::route ─▶ Agent::process_stream
//!                                          │
//!                    LlmProvider::stream ◀─┘
//!                          │
//!                    stream::normalize ─▶ StreamChunk ─▶ JSON lines
//! ```

pub mod chunk;
pub mod gemini;
pub mod markdown;
pub mod openai;
pub mod prompts;
pub mod registry;
pub mod request;
pub mod stream;
pub mod traits;

pub use chunk::{AskResult, ChatOutcome, EditResult, StreamChunk};
pub use gemini::GeminiAgent;
pub use markdown::extract_markdown;
pub use openai::OpenAiAgent;
pub use registry::AgentRegistry;
pub use request::{ChatMode, ChatRequest, DEFAULT_AGENT_ID, InvalidMode};
pub use traits::{Agent, ByteStream, ChunkStream, encode_jsonl};
