use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Commented default config written by `init`
pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AuditConfig {
    #[serde(default = "default_max_visible_chars")]
    pub max_visible_chars: usize,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
            headers: HashMap::new(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_visible_chars: default_max_visible_chars(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_temperature() -> Option<f32> {
    Some(0.3)
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".into()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".into()
}

fn default_max_visible_chars() -> usize {
    15000
}

fn default_bind() -> String {
    "127.0.0.1:8000".into()
}

impl Config {
    /// Load config from a TOML file and apply `key.path=value` overrides.
    /// A missing file falls back to built-in defaults.
    pub fn load(path: &str, overrides: &[String]) -> anyhow::Result<Self> {
        let content = if Path::new(path).exists() {
            debug!("Reading config from {}", path);
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        } else {
            info!("Config file {} not found, using defaults", path);
            String::new()
        };
        Self::parse(&content, overrides).with_context(|| format!("Invalid config {}", path))
    }

    pub fn parse(content: &str, overrides: &[String]) -> anyhow::Result<Self> {
        let mut table: toml::Table = toml::from_str(content)?;
        for entry in overrides {
            apply_override(&mut table, entry)?;
        }
        let config: Config = toml::Value::Table(table).try_into()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.audit.max_visible_chars == 0 {
            bail!("audit.max_visible_chars must be greater than 0");
        }
        if self.fetch.timeout_secs == 0 || self.llm.timeout_secs == 0 {
            bail!("timeouts must be greater than 0 seconds");
        }
        Ok(())
    }
}

/// Apply a single `a.b.c=value` override. The value is parsed as a TOML
/// literal when possible (numbers, booleans, quoted strings), else kept as a bare string.
fn apply_override(table: &mut toml::Table, entry: &str) -> anyhow::Result<()> {
    let Some((key, raw)) = entry.split_once('=') else {
        bail!("Override '{}' must look like key=value", entry);
    };
    let keys: Vec<&str> = key.trim().split('.').collect();
    if keys.iter().any(|k| k.is_empty()) {
        bail!("Override '{}' has an empty key segment", entry);
    }

    let raw = raw.trim();
    let value = toml::from_str::<toml::Table>(&format!("v = {}", raw))
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()));

    let Some((last, parents)) = keys.split_last() else {
        bail!("Override '{}' has no key", entry);
    };
    let mut current = table;
    for k in parents {
        let entry = current
            .entry(k.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        current = match entry {
            toml::Value::Table(t) => t,
            _ => bail!("Override '{}': '{}' is not a table", key, k),
        };
    }
    current.insert(last.to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_matches_defaults() {
        let config = Config::parse(DEFAULT_CONFIG, &[]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("", &[]).unwrap();
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.audit.max_visible_chars, 15000);
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_overrides() {
        let config = Config::parse(
            "[llm]\nmodel = \"gpt-4o\"\n",
            &[
                "llm.model=gpt-4o-mini".into(),
                "audit.max_visible_chars=500".into(),
                "llm.headers.X-Team=\"seo\"".into(),
            ],
        )
        .unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.audit.max_visible_chars, 500);
        assert_eq!(config.llm.headers.get("X-Team").map(String::as_str), Some("seo"));
    }

    #[test]
    fn test_override_without_equals_fails() {
        assert!(Config::parse("", &["llm.model".into()]).is_err());
    }

    #[test]
    fn test_zero_bound_rejected() {
        assert!(Config::parse("[audit]\nmax_visible_chars = 0\n", &[]).is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::load("/nonexistent/auditor.toml", &[]).unwrap();
        assert_eq!(config, Config::default());
    }
}
