use crate::config::LlmConfig;
use crate::error::{AuditError, Stage};
use crate::evaluator::{EvaluationRequest, ReasoningCapability};
use crate::util::truncate_chars;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, trace};

/// Characters of an error body kept in error messages
const ERROR_BODY_CHARS: usize = 500;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    fn new(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    response_format: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

/// OpenAI-compatible chat completions client used as the reasoning capability
pub struct OpenAiCapability {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: u32,
}

impl OpenAiCapability {
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self, AuditError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AuditError::Config(
                "LLM API key is empty; set OPENAI_API_KEY or pass --api-key".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| AuditError::Config("LLM API key contains invalid characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                AuditError::Config(format!("llm.headers: bad name '{}': {}", key, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                AuditError::Config(format!("llm.headers: bad value for '{}': {}", key, e))
            })?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuditError::Config(format!("Failed to build LLM client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl ReasoningCapability for OpenAiCapability {
    async fn evaluate(&self, request: &EvaluationRequest<'_>) -> Result<Value, AuditError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message::new("system", request.instructions.clone()),
                Message::new("user", request.evidence_message()),
            ],
            response_format: json!({"type": "json_object"}),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!("Requesting judgment from model {}", self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AuditError::Evaluation(format!(
                "LLM API returned {}: {}",
                status,
                truncate_chars(text.trim(), ERROR_BODY_CHARS).content
            )));
        }

        let chat: ChatResponse = response.json().await.map_err(transport_error)?;
        trace!("Response has {} choices", chat.choices.len());

        // First choice is the primary response
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AuditError::Evaluation("LLM reply has no content".into()))?;

        parse_reply(&content)
    }
}

fn transport_error(e: reqwest::Error) -> AuditError {
    if e.is_timeout() {
        AuditError::Timeout {
            stage: Stage::Evaluation,
        }
    } else {
        AuditError::Evaluation(format!("LLM request failed: {}", e))
    }
}

/// Parse the reply text as JSON, tolerating a surrounding Markdown code fence
fn parse_reply(content: &str) -> Result<Value, AuditError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced).map_err(|e| {
        AuditError::Evaluation(format!(
            "LLM reply is not JSON ({}): {}",
            e,
            truncate_chars(unfenced, ERROR_BODY_CHARS).content
        ))
    })
}
