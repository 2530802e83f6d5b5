//! Normalized stream chunks and their JSON-lines wire encoding.

use axum::body::Bytes;
use serde::Serialize;

use super::request::ChatMode;

/// One item of a normalized agent stream.
///
/// Zero or more `Delta`s are followed by exactly one `Final`. The final text
/// is not necessarily the concatenation of the deltas (edit mode extracts
/// the fenced block).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    Delta(String),
    Final(String),
}

impl StreamChunk {
    /// Encode as one UTF-8 JSON object terminated by `\n`.
    pub fn to_json_line(&self, mode: ChatMode) -> Bytes {
        let line = match self {
            StreamChunk::Delta(text) => WireChunk::Delta { text },
            StreamChunk::Final(text) => match mode {
                ChatMode::Ask => WireChunk::Final {
                    answer: Some(text),
                    proposed_content: None,
                },
                ChatMode::Edit => WireChunk::Final {
                    answer: None,
                    proposed_content: Some(text),
                },
            },
        };
        // Serializing borrowed strings into a Vec cannot fail.
        let mut buf = serde_json::to_vec(&line).unwrap_or_default();
        buf.push(b'\n');
        Bytes::from(buf)
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireChunk<'a> {
    Delta {
        text: &'a str,
    },
    Final {
        #[serde(skip_serializing_if = "Option::is_none")]
        answer: Option<&'a str>,
        #[serde(rename = "proposedContent", skip_serializing_if = "Option::is_none")]
        proposed_content: Option<&'a str>,
    },
}

/// Non-streaming ask result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskResult {
    pub answer: String,
}

/// Non-streaming edit result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditResult {
    #[serde(rename = "proposedContent")]
    pub proposed_content: String,
}

/// Terminal result of the synchronous chat variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChatOutcome {
    Ask(AskResult),
    Edit(EditResult),
}

impl ChatOutcome {
    pub fn new(mode: ChatMode, text: String) -> Self {
        match mode {
            ChatMode::Ask => ChatOutcome::Ask(AskResult { answer: text }),
            ChatMode::Edit => ChatOutcome::Edit(EditResult {
                proposed_content: text,
            }),
        }
    }
}
