pub mod openai;

pub use openai::OpenAiCapability;

use crate::config::LlmConfig;
use crate::error::AuditError;
use crate::evaluator::ReasoningCapability;
use std::sync::Arc;

/// Create the process-wide reasoning capability.
///
/// Fails with a configuration error when no API key is available.
pub fn create_capability(
    config: &LlmConfig,
    api_key: Option<&str>,
) -> Result<Arc<dyn ReasoningCapability>, AuditError> {
    let Some(api_key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
        return Err(AuditError::Config(
            "OPENAI_API_KEY is not set; export it, add it to .env, or pass --api-key".into(),
        ));
    };
    tracing::debug!(
        "Creating OpenAI-compatible capability with model {} at {}",
        config.model,
        config.base_url
    );
    Ok(Arc::new(OpenAiCapability::new(config, api_key)?))
}
