use crate::error::AuditError;
use crate::policy::Policy;
use crate::types::{AuditStatus, Severity, Verdict, Violation};
use crate::util::truncate_chars;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Evidence and instructions for one policy judgment
#[derive(Debug, Clone)]
pub struct EvaluationRequest<'a> {
    /// Rendered policy taxonomy
    pub instructions: String,
    pub page_title: &'a str,
    pub structured_data: &'a [Value],
    /// Visible text, already truncated
    pub visible_text: &'a str,
}

impl EvaluationRequest<'_> {
    /// Render the evidence as the user message of a chat exchange
    pub fn evidence_message(&self) -> String {
        let json_ld = serde_json::to_string_pretty(self.structured_data)
            .unwrap_or_else(|_| "[]".to_string());
        format!(
            "Page title:\n\n{}\n\n\
            JSON-LD structured data ({} items):\n\n\
            ```json\n{}\n```\n\n\
            Visible text:\n\n\
            <visible_text>\n{}\n</visible_text>\n\n\
            Check the structured data against every rule and reply with the JSON object.",
            if self.page_title.is_empty() {
                "(none)"
            } else {
                self.page_title
            },
            self.structured_data.len(),
            json_ld,
            self.visible_text
        )
    }
}

/// Opaque service that judges structured data against a policy.
///
/// Implementations return the raw reply object; it is treated as untrusted
/// and normalized by [`PolicyEvaluator`].
#[async_trait]
pub trait ReasoningCapability: Send + Sync {
    async fn evaluate(&self, request: &EvaluationRequest<'_>) -> Result<Value, AuditError>;
}

/// Applies the policy to extracted evidence
#[derive(Clone)]
pub struct PolicyEvaluator {
    capability: Arc<dyn ReasoningCapability>,
    policy: Arc<Policy>,
    max_visible_chars: usize,
}

impl PolicyEvaluator {
    pub fn new(
        capability: Arc<dyn ReasoningCapability>,
        policy: Arc<Policy>,
        max_visible_chars: usize,
    ) -> Self {
        Self {
            capability,
            policy,
            max_visible_chars,
        }
    }

    /// Judge the evidence. Pages without structured data fail immediately
    /// without consulting the reasoning capability.
    pub async fn evaluate(
        &self,
        structured_data: &[Value],
        visible_text: &str,
        page_title: &str,
    ) -> Result<Verdict, AuditError> {
        if structured_data.is_empty() {
            info!("No structured data on '{}', skipping evaluation", page_title);
            return Ok(no_schema_verdict(page_title));
        }

        let visible_text = truncate_chars(visible_text, self.max_visible_chars).content;
        let request = EvaluationRequest {
            instructions: self.policy.render_instructions(),
            page_title,
            structured_data,
            visible_text,
        };

        debug!(
            "Evaluating {} structured data items against {} chars of visible text",
            structured_data.len(),
            visible_text.chars().count()
        );
        let reply = self.capability.evaluate(&request).await?;
        trace!("Evaluator reply: {}", reply);

        let verdict = normalize_verdict(&reply);
        info!(
            "Evaluation finished: {} with {} violations",
            verdict.status.as_str(),
            verdict.violations.len()
        );
        Ok(verdict)
    }
}

/// Deterministic failure for pages that carry no structured data
pub fn no_schema_verdict(page_title: &str) -> Verdict {
    let name = if page_title.is_empty() {
        "this page".to_string()
    } else {
        format!("\"{}\"", page_title)
    };
    Verdict {
        status: AuditStatus::Fail,
        summary: format!("No structured data (JSON-LD) markup found on {}.", name),
        violations: Vec::new(),
    }
}

/// Turn an untrusted reply into a verdict, defaulting anything absent or malformed
pub fn normalize_verdict(reply: &Value) -> Verdict {
    let object = reply.as_object();

    let violations: Vec<Violation> = match reply {
        Value::Array(items) => normalize_violations(items),
        Value::Object(map) => match map.get("violations").or_else(|| map.get("risks")) {
            Some(Value::Array(items)) => normalize_violations(items),
            Some(other) => {
                warn!("Ignoring non-array violations field: {}", other);
                Vec::new()
            }
            None => Vec::new(),
        },
        other => {
            warn!("Evaluator reply is neither object nor array: {}", other);
            Vec::new()
        }
    };

    let reported_status = object
        .and_then(|m| m.get("status"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_ascii_lowercase());
    let status = match reported_status.as_deref() {
        Some("pass") => AuditStatus::Pass,
        Some("fail") => AuditStatus::Fail,
        Some(other) => {
            warn!("Unrecognised status '{}', defaulting to Fail", other);
            AuditStatus::Fail
        }
        None => AuditStatus::Fail,
    };
    let status = if violations.iter().any(|v| v.severity == Severity::High) {
        AuditStatus::Fail
    } else {
        status
    };

    let summary = object
        .and_then(|m| m.get("summary"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_summary(status, &violations));

    Verdict {
        status,
        summary,
        violations,
    }
}

fn normalize_violations(items: &[Value]) -> Vec<Violation> {
    items
        .iter()
        .filter_map(|item| match item.as_object() {
            Some(map) => Some(normalize_violation(map)),
            None => {
                warn!("Dropping non-object violation entry: {}", item);
                None
            }
        })
        .collect()
}

fn normalize_violation(map: &Map<String, Value>) -> Violation {
    let text = |key: &str| {
        map.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let severity = text("severity")
        .and_then(|s| Severity::parse(&s))
        .unwrap_or(Severity::Low);
    let policy_reference = text("policy_reference").or_else(|| text("policyReference"));
    let issue = text("issue")
        .or_else(|| text("title"))
        .or_else(|| policy_reference.clone())
        .unwrap_or_else(|| "Unspecified issue".to_string());

    Violation {
        severity,
        issue,
        description: text("description").unwrap_or_default(),
        policy_reference,
    }
}

fn default_summary(status: AuditStatus, violations: &[Violation]) -> String {
    match (status, violations.len()) {
        (AuditStatus::Pass, 0) => "No structured data policy violations found.".to_string(),
        (AuditStatus::Fail, 0) => "Structured data failed the policy review.".to_string(),
        (_, 1) => "Found 1 structured data policy violation.".to_string(),
        (_, n) => format!("Found {} structured data policy violations.", n),
    }
}
