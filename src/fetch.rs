use crate::config::FetchConfig;
use crate::error::{AuditError, Stage};
use anyhow::Context;
use reqwest::Url;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{debug, warn};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Validate a scan target: absolute URL with an http or https scheme
pub fn parse_target(raw: &str) -> Result<Url, AuditError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AuditError::Input("url is required".into()));
    }
    let url = Url::parse(raw)
        .map_err(|e| AuditError::Input(format!("invalid url '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        "http" | "https" => Err(AuditError::Input(format!("url '{}' has no host", raw))),
        scheme => Err(AuditError::Input(format!(
            "unsupported url scheme '{}', expected http or https",
            scheme
        ))),
    }
}

/// Page fetcher with a browser-like identity and a bounded total timeout
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        Self::with_timeout(config, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(config: &FetchConfig, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .context("fetch.accept_language is not a valid header value")?,
        );

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch raw markup. Issues exactly one request and never retries.
    pub async fn fetch(&self, url: &Url) -> Result<String, AuditError> {
        debug!("Fetching {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Fetching {} returned {}", url, status);
            return Err(AuditError::Fetch {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let markup = response.text().await.map_err(fetch_error)?;
        debug!("Fetched {} bytes from {}", markup.len(), url);
        Ok(markup)
    }
}

fn fetch_error(e: reqwest::Error) -> AuditError {
    if e.is_timeout() {
        AuditError::Timeout {
            stage: Stage::Fetch,
        }
    } else {
        AuditError::Internal(anyhow::Error::new(e).context("Error fetching page"))
    }
}
