use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a scan request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Absolute http(s) URL of the page to audit
    pub url: String,
}

/// Severity of a policy violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Case-insensitive parse, `None` for anything unrecognised
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Overall audit outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AuditStatus {
    Pass,
    Fail,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
        }
    }
}

/// A structured data policy violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    /// High, Medium or Low
    pub severity: Severity,
    /// Short label, usually the name of the violated rule
    pub issue: String,
    /// Explanation citing the structured data and visible text involved
    pub description: String,
    /// Policy the violation falls under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_reference: Option<String>,
}

/// Judgment returned by the policy evaluator, before it is merged with the evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    /// "Pass" when no violations were found, "Fail" otherwise
    pub status: AuditStatus,
    /// One or two sentence summary of the findings
    pub summary: String,
    /// Violations found, empty when the page passes
    pub violations: Vec<Violation>,
}

/// Evidence pulled out of a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedContent {
    pub page_title: String,
    pub visible_text: String,
    pub structured_data: Vec<Value>,
}

/// Final audit record returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub status: AuditStatus,
    pub summary: String,
    #[serde(rename = "json_ld")]
    pub structured_data: Vec<Value>,
    pub visible_text: String,
    pub violations: Vec<Violation>,
    pub page_title: String,
}

impl AuditResult {
    pub fn has_high_severity(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::High)
    }
}
