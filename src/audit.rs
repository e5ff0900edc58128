use crate::error::AuditError;
use crate::evaluator::PolicyEvaluator;
use crate::extract::extract_content;
use crate::fetch::{Fetcher, parse_target};
use crate::types::{AuditResult, AuditStatus, ExtractedContent, Verdict};
use tracing::info;

/// Full scan pipeline: validate, fetch, extract, evaluate, assemble
#[derive(Clone)]
pub struct Auditor {
    fetcher: Fetcher,
    evaluator: PolicyEvaluator,
    max_visible_chars: usize,
}

impl Auditor {
    pub fn new(fetcher: Fetcher, evaluator: PolicyEvaluator, max_visible_chars: usize) -> Self {
        Self {
            fetcher,
            evaluator,
            max_visible_chars,
        }
    }

    /// Audit a single page. Any stage failure aborts the scan with no partial result.
    pub async fn audit(&self, url: &str) -> Result<AuditResult, AuditError> {
        let start = std::time::Instant::now();
        let target = parse_target(url)?;
        info!("Scanning {}", target);

        let markup = self.fetcher.fetch(&target).await?;
        let extracted = extract_content(&markup, self.max_visible_chars);
        info!(
            "Extracted {} structured data items and {} chars of visible text from {}",
            extracted.structured_data.len(),
            extracted.visible_text.chars().count(),
            target
        );

        let verdict = self
            .evaluator
            .evaluate(
                &extracted.structured_data,
                &extracted.visible_text,
                &extracted.page_title,
            )
            .await?;

        let result = assemble(extracted, verdict);
        info!(
            "Done scanning {}: {} ({:.2}s)",
            target,
            result.status.as_str(),
            start.elapsed().as_secs_f64()
        );
        Ok(result)
    }
}

/// Merge evidence and verdict. A page with no structured data, or with any
/// High severity violation, always fails.
pub fn assemble(extracted: ExtractedContent, verdict: Verdict) -> AuditResult {
    let mut result = AuditResult {
        status: verdict.status,
        summary: verdict.summary,
        structured_data: extracted.structured_data,
        visible_text: extracted.visible_text,
        violations: verdict.violations,
        page_title: extracted.page_title,
    };
    if result.structured_data.is_empty() || result.has_high_severity() {
        result.status = AuditStatus::Fail;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::normalize_verdict;
    use crate::types::{Severity, Violation};
    use serde_json::json;

    fn extracted(data: Vec<serde_json::Value>) -> ExtractedContent {
        ExtractedContent {
            page_title: "Title".into(),
            visible_text: "Text".into(),
            structured_data: data,
        }
    }

    #[test]
    fn test_assemble_keeps_evaluator_status() {
        let verdict = Verdict {
            status: AuditStatus::Pass,
            summary: "Clean".into(),
            violations: vec![],
        };
        let result = assemble(extracted(vec![json!({"@type": "Article"})]), verdict);
        assert_eq!(result.status, AuditStatus::Pass);
        assert_eq!(result.summary, "Clean");
        assert_eq!(result.page_title, "Title");
        assert_eq!(result.visible_text, "Text");
    }

    #[test]
    fn test_assemble_empty_structured_data_fails() {
        let verdict = Verdict {
            status: AuditStatus::Pass,
            summary: String::new(),
            violations: vec![],
        };
        assert_eq!(assemble(extracted(vec![]), verdict).status, AuditStatus::Fail);
    }

    #[test]
    fn test_assemble_high_severity_fails() {
        let verdict = Verdict {
            status: AuditStatus::Pass,
            summary: String::new(),
            violations: vec![Violation {
                severity: Severity::High,
                issue: "Price mismatch".into(),
                description: String::new(),
                policy_reference: None,
            }],
        };
        let result = assemble(extracted(vec![json!({"@type": "Offer"})]), verdict);
        assert_eq!(result.status, AuditStatus::Fail);
    }

    #[test]
    fn test_statusless_empty_reply_does_not_pass() {
        let verdict = normalize_verdict(&json!([]));
        let result = assemble(extracted(vec![json!({"@type": "Product"})]), verdict);
        assert_eq!(result.status, AuditStatus::Fail);
        assert!(result.violations.is_empty());
    }
}
