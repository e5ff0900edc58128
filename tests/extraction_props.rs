//! Property-based tests for evidence extraction

use proptest::prelude::*;
use schema_auditor::extract::{extract_content, extract_structured_data};
use serde_json::json;

/// Plain body text without markup-significant characters
fn body_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,]{0,400}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn extraction_is_idempotent(text in body_text(), rating in 0u32..1000) {
        let html = format!(
            r#"<html><head><title>T</title>
            <script type="application/ld+json">{}</script></head>
            <body><p>{}</p></body></html>"#,
            json!({"@type": "Product", "aggregateRating": {"ratingCount": rating}}),
            text
        );
        prop_assert_eq!(extract_content(&html, 15000), extract_content(&html, 15000));
    }

    #[test]
    fn visible_text_never_exceeds_bound(len in 0usize..3000, bound in 1usize..2000) {
        let html = format!("<body><p>{}</p></body>", "y".repeat(len));
        let content = extract_content(&html, bound);
        prop_assert_eq!(content.visible_text.chars().count(), len.min(bound));
    }

    #[test]
    fn array_blocks_keep_length_and_order(n in 0usize..20) {
        let items: Vec<_> = (0..n).map(|i| json!({"position": i})).collect();
        let html = format!(
            r#"<script type="application/ld+json">{}</script>"#,
            serde_json::Value::Array(items.clone())
        );
        prop_assert_eq!(extract_structured_data(&html), items);
    }

    #[test]
    fn visible_text_has_no_whitespace_runs(words in prop::collection::vec("[a-z]{1,8}", 0..30)) {
        let html = format!("<body>\n  {}\n</body>", words.join(" \n\t "));
        let content = extract_content(&html, 15000);
        prop_assert_eq!(content.visible_text, words.join(" "));
    }
}

#[test]
fn twenty_thousand_chars_truncate_to_bound() {
    let html = format!("<body>{}</body>", "z".repeat(20000));
    let content = extract_content(&html, 15000);
    assert_eq!(content.visible_text.chars().count(), 15000);
}
