use crate::util::collapse_whitespace;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

/// Elements whose subtree never renders as readable text
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "object", "embed", "iframe",
];

/// Elements that break words apart when rendered
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "dialog", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "li", "main", "nav", "ol", "option", "p", "pre", "section", "summary",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("body").expect("Failed to parse body selector - this is a bug")
});

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("title").expect("Failed to parse title selector - this is a bug")
});

/// Reader-visible body text of raw markup, whitespace collapsed
pub fn extract_visible_text(markup: &str) -> String {
    visible_text_of(&Html::parse_document(markup))
}

/// Reader-visible body text of a parsed document.
///
/// No scripts run, so anything a page injects client-side is absent here.
pub fn visible_text_of(document: &Html) -> String {
    let Some(body) = document.select(&BODY_SELECTOR).next() else {
        return String::new();
    };
    let mut raw = String::new();
    collect_text(body, &mut raw);
    collapse_whitespace(&raw)
}

/// Text of the first `<title>`, empty when the page has none
pub fn page_title_of(document: &Html) -> String {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| collapse_whitespace(&title.text().collect::<String>()))
        .unwrap_or_default()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                if EXCLUDED_TAGS.contains(&el.name()) || is_hidden(el) {
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&el.name());
                if block {
                    out.push(' ');
                }
                collect_text(child_ref, out);
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Markup-level hiding: the `hidden` attribute, or an inline style with
/// `display: none`, `visibility: hidden|collapse` or `opacity: 0`
fn is_hidden(el: &Element) -> bool {
    if el.attr("hidden").is_some() {
        return true;
    }
    let Some(style) = el.attr("style") else {
        return false;
    };

    style.split(';').any(|decl| {
        let Some((prop, value)) = decl.split_once(':') else {
            return false;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();
        match prop.as_str() {
            "display" => value == "none",
            "visibility" => value == "hidden" || value == "collapse",
            "opacity" => value
                .trim_end_matches('%')
                .parse::<f32>()
                .is_ok_and(|o| o == 0.0),
            _ => false,
        }
    })
}
