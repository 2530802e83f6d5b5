//! System instructions and user payloads for ask and edit mode.

use super::request::{ChatMode, ChatRequest};

pub const ASK_SYSTEM_PROMPT: &str = "You are an expert technical writer and editor for Markdown documents. \
Answer questions precisely and concisely based on the provided content.";

pub const EDIT_SYSTEM_PROMPT: &str = "You are an expert Markdown editor. Always return the FULL UPDATED MARKDOWN \
inside a single fenced code block using the language identifier 'markdown'. \
Do not include any commentary outside the code fence.";

const EDIT_REMINDER: &str =
    "Remember to respond ONLY with a single fenced code block containing the full updated markdown.";

/// System instruction for the given mode.
pub fn system_prompt(mode: ChatMode) -> &'static str {
    match mode {
        ChatMode::Ask => ASK_SYSTEM_PROMPT,
        ChatMode::Edit => EDIT_SYSTEM_PROMPT,
    }
}

/// Build the user message: file path, fenced content, instruction and the
/// optional selection.
pub fn user_payload(request: &ChatRequest) -> String {
    let mut parts = vec![
        format!("File Path: {}", request.path),
        format!("File Content:\n```markdown\n{}\n```", request.content),
        format!("User Request: {}", request.message),
    ];
    if let Some(ref selection) = request.selection {
        parts.push(format!("Selection:\n```markdown\n{}\n```", selection));
    }
    if request.mode == ChatMode::Edit {
        parts.push(EDIT_REMINDER.to_string());
    }
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_payload_layout() {
        let request = ChatRequest::new("notes.md", "# Notes\n\nhi", "summarize", ChatMode::Ask);
        let payload = user_payload(&request);
        assert_eq!(
            payload,
            "File Path: notes.md\n\n\
             File Content:\n```markdown\n# Notes\n\nhi\n```\n\n\
             User Request: summarize"
        );
    }

    #[test]
    fn selection_is_appended() {
        let request = ChatRequest::new("a.md", "body", "explain", ChatMode::Ask)
            .with_selection(Some("picked text".to_string()));
        let payload = user_payload(&request);
        assert!(payload.ends_with("Selection:\n```markdown\npicked text\n```"));
    }

    #[test]
    fn edit_payload_ends_with_reminder() {
        let request = ChatRequest::new("a.md", "body", "fix typos", ChatMode::Edit);
        assert!(user_payload(&request).ends_with(EDIT_REMINDER));
        assert!(system_prompt(ChatMode::Edit).contains("'markdown'"));
        assert!(!system_prompt(ChatMode::Ask).contains("fenced"));
    }
}
