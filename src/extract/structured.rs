use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

const JSON_LD_TYPE: &str = "application/ld+json";

static SCRIPT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script[type]").expect("Failed to parse script selector - this is a bug")
});

/// Extract every JSON-LD item from raw markup, in document order
pub fn extract_structured_data(markup: &str) -> Vec<Value> {
    extract_from_document(&Html::parse_document(markup))
}

/// Extract every JSON-LD item from a parsed document.
///
/// Blocks that fail to parse are skipped. Array blocks are flattened so each
/// element becomes its own item.
pub fn extract_from_document(document: &Html) -> Vec<Value> {
    let mut items = Vec::new();

    let blocks = document.select(&SCRIPT_SELECTOR).filter(|el| {
        el.value()
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(JSON_LD_TYPE))
    });

    for (index, block) in blocks.enumerate() {
        let raw: String = block.text().collect();
        let payload = strip_wrappers(&raw);
        if payload.is_empty() {
            debug!("Skipping empty JSON-LD block #{}", index);
            continue;
        }

        match serde_json::from_str::<Value>(payload) {
            Ok(Value::Array(elements)) => {
                debug!("JSON-LD block #{} holds {} items", index, elements.len());
                items.extend(elements);
            }
            Ok(value) => items.push(value),
            Err(e) => warn!("Skipping malformed JSON-LD block #{}: {}", index, e),
        }
    }

    debug!("Extracted {} structured data items", items.len());
    items
}

/// Strip comment and CDATA guards some CMSes wrap around script bodies
fn strip_wrappers(raw: &str) -> &str {
    let mut payload = raw.trim();
    loop {
        let before = payload;
        for (open, close) in [("<!--", "-->"), ("//<![CDATA[", "//]]>"), ("<![CDATA[", "]]>")] {
            if let Some(inner) = payload
                .strip_prefix(open)
                .and_then(|rest| rest.strip_suffix(close))
            {
                payload = inner.trim();
            }
        }
        if payload == before {
            return payload;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_blocks() {
        let html = "<html><head><script>var x = 1;</script></head><body>Hi</body></html>";
        assert!(extract_structured_data(html).is_empty());
    }

    #[test]
    fn test_single_object() {
        let html = r#"<script type="application/ld+json">{"@type": "Product", "name": "Mug"}</script>"#;
        let items = extract_structured_data(html);
        assert_eq!(items, vec![json!({"@type": "Product", "name": "Mug"})]);
    }

    #[test]
    fn test_array_block_is_flattened_in_order() {
        let html = r#"<script type="application/ld+json">
            [{"@type": "A"}, {"@type": "B"}, {"@type": "C"}]
        </script>"#;
        let items = extract_structured_data(html);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["@type"], "A");
        assert_eq!(items[1]["@type"], "B");
        assert_eq!(items[2]["@type"], "C");
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let html = r#"
            <script type="application/ld+json">{"@type": "Broken",</script>
            <script type="application/ld+json">{"@type": "FAQPage"}</script>
        "#;
        let items = extract_structured_data(html);
        assert_eq!(items, vec![json!({"@type": "FAQPage"})]);
    }

    #[test]
    fn test_order_across_blocks() {
        let html = r#"
            <head><script type="application/ld+json">{"n": 1}</script></head>
            <body>
              <script type="application/ld+json">[{"n": 2}, {"n": 3}]</script>
              <script type="application/ld+json">{"n": 4}</script>
            </body>
        "#;
        let numbers: Vec<i64> = extract_structured_data(html)
            .iter()
            .map(|v| v["n"].as_i64().unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_type_attribute_is_case_insensitive() {
        let html = r#"<script type=" Application/LD+JSON ">{"@type": "Organization"}</script>"#;
        assert_eq!(extract_structured_data(html).len(), 1);
    }

    #[test]
    fn test_other_script_types_ignored() {
        let html = r#"
            <script type="application/json">{"@type": "NotLd"}</script>
            <script type="text/javascript">{"@type": "NotLd"}</script>
        "#;
        assert!(extract_structured_data(html).is_empty());
    }

    #[test]
    fn test_scalar_block_is_kept() {
        let html = r#"<script type="application/ld+json">"just a string"</script>"#;
        assert_eq!(extract_structured_data(html), vec![json!("just a string")]);
    }

    #[test]
    fn test_wrapped_blocks() {
        let html = r#"
            <script type="application/ld+json"><!-- {"n": 1} --></script>
            <script type="application/ld+json">//<![CDATA[
                {"n": 2}
            //]]></script>
        "#;
        let items = extract_structured_data(html);
        assert_eq!(items, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn test_empty_block_skipped() {
        let html = r#"<script type="application/ld+json">   </script>"#;
        assert!(extract_structured_data(html).is_empty());
    }
}
