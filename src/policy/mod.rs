use crate::types::{Severity, Verdict};
use serde::Deserialize;

/// Embedded policy text, reviewed and versioned alongside the code
const RULES_TOML: &str = include_str!("rules.toml");

#[derive(Deserialize, Debug, Clone)]
pub struct Policy {
    /// Policy text version, bumped on any rule change
    pub version: String,
    pub rules: Vec<PolicyRule>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PolicyRule {
    /// Rule name, also used as the violation `issue` label
    pub name: String,
    pub severity: Severity,
    /// One-line condition that triggers the rule
    pub trigger: String,
    /// Detailed checking instructions for the evaluator
    pub instruction: String,
}

impl Policy {
    /// The built-in structured data policy
    pub fn builtin() -> anyhow::Result<Self> {
        Self::parse(RULES_TOML)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let policy: Policy = toml::from_str(content)?;
        if policy.rules.is_empty() {
            anyhow::bail!("Policy {} defines no rules", policy.version);
        }
        Ok(policy)
    }

    #[cfg(test)]
    pub fn rule(&self, name: &str) -> Option<&PolicyRule> {
        self.rules.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Render the instruction context sent to the reasoning capability
    pub fn render_instructions(&self) -> String {
        let mut out = String::from(
            "You are a search quality evaluator. Your task is to detect structured data \
            (JSON-LD) that validates technically but makes claims readers of the page cannot see.\n\n\
            You receive the page title, every JSON-LD item found on the page, and the page's \
            visible text. The visible text was extracted without running JavaScript, with scripts, \
            styles and hidden elements removed, and may be truncated.\n\n",
        );

        out.push_str(&format!("Rules (policy version {}):\n\n", self.version));
        for (i, rule) in self.rules.iter().enumerate() {
            out.push_str(&format!(
                "{}. {} ({} severity)\n\
                Trigger: {}\n\
                {}\n\n",
                i + 1,
                rule.name,
                rule.severity.as_str(),
                rule.trigger.trim(),
                rule.instruction.trim()
            ));
        }

        let schema = schemars::schema_for!(Verdict);
        let schema = serde_json::to_string_pretty(&schema).unwrap_or_default();
        out.push_str(&format!(
            "Output:\n\n\
            Reply with a single JSON object matching this schema, and nothing else:\n\n\
            ```json\n{}\n```\n\n\
            Use the rule name as `issue` and \"Structured data policy v{}\" as `policy_reference`. \
            Use the rule's severity. Set `status` to \"Fail\" if any violation is reported, \
            otherwise \"Pass\" with an empty `violations` array.",
            schema, self.version
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_policy_parses() {
        let policy = Policy::builtin().unwrap();
        assert!(!policy.version.is_empty());
        assert_eq!(policy.rules.len(), 7);
    }

    #[test]
    fn test_builtin_severities() {
        let policy = Policy::builtin().unwrap();
        let expected = [
            ("Ghost Ratings", Severity::High),
            ("Hidden structured content", Severity::High),
            ("Missing expected content block", Severity::Medium),
            ("Irrelevant type usage", Severity::Medium),
            ("Self-referential rating", Severity::High),
            ("Price mismatch", Severity::High),
            ("Keyword stuffing", Severity::Medium),
        ];
        for (name, severity) in expected {
            let rule = policy.rule(name).unwrap_or_else(|| panic!("missing rule {}", name));
            assert_eq!(rule.severity, severity, "{}", name);
            assert!(!rule.trigger.trim().is_empty());
            assert!(!rule.instruction.trim().is_empty());
        }
    }

    #[test]
    fn test_rule_names_unique() {
        let policy = Policy::builtin().unwrap();
        let mut names: Vec<_> = policy.rules.iter().map(|r| r.name.to_lowercase()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), policy.rules.len());
    }

    #[test]
    fn test_render_instructions() {
        let policy = Policy::builtin().unwrap();
        let text = policy.render_instructions();
        assert!(text.contains("1. Ghost Ratings (High severity)"));
        assert!(text.contains("7. Keyword stuffing (Medium severity)"));
        assert!(text.contains(&policy.version));
        assert!(text.contains("\"violations\""));
        assert!(text.contains("without running JavaScript"));
    }

    #[test]
    fn test_empty_policy_rejected() {
        assert!(Policy::parse("version = \"0\"\nrules = []\n").is_err());
    }
}
