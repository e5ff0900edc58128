//! Evidence extraction from raw page markup: JSON-LD blocks, reader-visible
//! text and the page title.

pub mod structured;
pub mod visible;

pub use structured::extract_structured_data;
pub use visible::extract_visible_text;

use crate::types::ExtractedContent;
use crate::util::truncate_chars;
use scraper::Html;
use tracing::debug;

/// Parse markup once and pull out all evidence, keeping at most
/// `max_visible_chars` characters of visible text.
pub fn extract_content(markup: &str, max_visible_chars: usize) -> ExtractedContent {
    let document = Html::parse_document(markup);

    let structured_data = structured::extract_from_document(&document);
    let page_title = visible::page_title_of(&document);
    let text = visible::visible_text_of(&document);

    let truncated = truncate_chars(&text, max_visible_chars);
    if truncated.truncated {
        debug!(
            "Visible text truncated to {}/{} chars",
            max_visible_chars, truncated.total_chars
        );
    }

    ExtractedContent {
        page_title,
        visible_text: truncated.content.to_string(),
        structured_data,
    }
}
