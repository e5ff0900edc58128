use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Pipeline stage that can exceed its time bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Evaluation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => f.write_str("page fetch"),
            Stage::Evaluation => f.write_str("policy evaluation"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Invalid request: {0}")]
    Input(String),

    #[error("Failed to fetch page: {status} {status_text}")]
    Fetch { status: u16, status_text: String },

    #[error("Timed out during {stage}")]
    Timeout { stage: Stage },

    #[error("Policy evaluation failed: {0}")]
    Evaluation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuditError {
    /// HTTP status reported to API callers
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuditError::Input(_) => StatusCode::BAD_REQUEST,
            AuditError::Fetch { status, .. } => {
                // Upstream statuses are mirrored; 2xx/1xx or garbage becomes a gateway error
                StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error() || s.is_redirection())
                    .unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AuditError::Timeout {
                stage: Stage::Fetch,
            } => StatusCode::REQUEST_TIMEOUT,
            AuditError::Timeout {
                stage: Stage::Evaluation,
            }
            | AuditError::Evaluation(_)
            | AuditError::Config(_)
            | AuditError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuditError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AuditError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                "Internal error".to_string()
            }
            e if status.is_server_error() => {
                tracing::error!("{}", e);
                e.to_string()
            }
            e => e.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
