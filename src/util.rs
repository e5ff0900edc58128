/// Result of a truncation operation
#[derive(Debug, Clone, PartialEq)]
pub struct TruncateResult<'a> {
    pub content: &'a str,
    pub truncated: bool,
    /// Length of the input in characters
    pub total_chars: usize,
}

/// Keep at most `max_chars` characters, never splitting a character
pub fn truncate_chars(content: &str, max_chars: usize) -> TruncateResult<'_> {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => TruncateResult {
            content: &content[..byte_idx],
            truncated: true,
            total_chars: content.chars().count(),
        },
        None => TruncateResult {
            content,
            truncated: false,
            total_chars: content.chars().count(),
        },
    }
}

/// Collapse every whitespace run to a single space and trim both ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
