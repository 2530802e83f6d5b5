//! Fenced code block extraction for edit-mode answers.

use std::sync::LazyLock;

use regex::Regex;

/// First fenced block, optional `markdown`/`md` tag, any case.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```(?:markdown|md)?[ \t]*\r?\n(.*?)\r?\n[ \t]*```")
        .expect("fence pattern is valid")
});

/// Return the trimmed body of the first fenced block in `text`, or the whole
/// trimmed text when there is none.
pub fn extract_markdown(text: &str) -> String {
    match FENCE_RE.captures(text).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim().to_string(),
        None => text.trim().to_string(),
    }
}
