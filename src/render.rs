use crate::types::{AuditResult, Severity};

/// Characters of visible text shown in the Markdown report
const VISIBLE_TEXT_PREVIEW_CHARS: usize = 500;

/// Format an audit result as a Markdown report
pub fn format_report(url: &str, result: &AuditResult) -> String {
    let mut output = String::new();
    output.push_str(&format!("# Structured data audit: {}\n\n", url));
    if !result.page_title.is_empty() {
        output.push_str(&format!("**Page:** {}\n\n", result.page_title));
    }
    output.push_str(&format!("**Status:** {}\n\n", result.status.as_str()));
    output.push_str(&format!("{}\n\n", result.summary.trim()));

    output.push_str("## Violations\n\n");
    if result.violations.is_empty() {
        output.push_str("No violations found\n\n");
    } else {
        for severity in [Severity::High, Severity::Medium, Severity::Low] {
            for violation in result.violations.iter().filter(|v| v.severity == severity) {
                output.push_str(&format!(
                    "- **[{}] {}**: {}",
                    severity.as_str(),
                    violation.issue,
                    violation.description
                ));
                if let Some(reference) = &violation.policy_reference {
                    output.push_str(&format!(" _({})_", reference));
                }
                output.push('\n');
            }
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "## Structured data ({} items)\n\n",
        result.structured_data.len()
    ));
    if !result.structured_data.is_empty() {
        let json = serde_json::to_string_pretty(&result.structured_data).unwrap_or_default();
        let backticks = get_fence_backticks(&json);
        output.push_str(&format!("{}json\n{}\n{}\n\n", backticks, json, backticks));
    }

    output.push_str("## Visible text\n\n");
    let preview = crate::util::truncate_chars(&result.visible_text, VISIBLE_TEXT_PREVIEW_CHARS);
    if preview.truncated {
        output.push_str(&format!(
            "> {}...\n\n_({} of {} chars shown)_\n",
            preview.content, VISIBLE_TEXT_PREVIEW_CHARS, preview.total_chars
        ));
    } else {
        output.push_str(&format!("> {}\n", preview.content));
    }
    output
}

/// Get appropriate number of backticks for Markdown code fence
/// Returns at least 3 backticks, or more if content contains backtick sequences
fn get_fence_backticks(content: &str) -> String {
    const MIN_BACKTICKS: usize = 3;
    let max_backticks = content
        .as_bytes()
        .split(|&b| b != b'`')
        .filter(|s| !s.is_empty())
        .map(|s| s.len())
        .max()
        .unwrap_or(0);
    "`".repeat((max_backticks + 1).max(MIN_BACKTICKS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuditStatus, Violation};
    use serde_json::json;

    fn result(violations: Vec<Violation>) -> AuditResult {
        AuditResult {
            status: AuditStatus::Fail,
            summary: "Ratings are hidden.".into(),
            structured_data: vec![json!({"@type": "Product"})],
            visible_text: "Blue mug".into(),
            violations,
            page_title: "Shop".into(),
        }
    }

    #[test]
    fn test_report_orders_by_severity() {
        let report = format_report(
            "https://example.com",
            &result(vec![
                Violation {
                    severity: Severity::Medium,
                    issue: "Keyword stuffing".into(),
                    description: "cheap mugs near me".into(),
                    policy_reference: None,
                },
                Violation {
                    severity: Severity::High,
                    issue: "Ghost Ratings".into(),
                    description: "50 ratings not shown".into(),
                    policy_reference: Some("Structured data policy v1".into()),
                },
            ]),
        );
        let high = report.find("[High] Ghost Ratings").unwrap();
        let medium = report.find("[Medium] Keyword stuffing").unwrap();
        assert!(high < medium);
        assert!(report.contains("_(Structured data policy v1)_"));
        assert!(report.contains("**Status:** Fail"));
        assert!(report.contains("## Structured data (1 items)"));
    }

    #[test]
    fn test_report_without_violations() {
        let report = format_report("https://example.com", &result(vec![]));
        assert!(report.contains("No violations found"));
        assert!(report.contains("> Blue mug"));
    }

    #[test]
    fn test_fence_backticks() {
        assert_eq!(get_fence_backticks("plain"), "```");
        assert_eq!(get_fence_backticks("has ```` fence"), "`````");
    }
}
