//! HTTP API over the scan pipeline

use crate::audit::Auditor;
use crate::error::AuditError;
use crate::types::{AuditResult, ScanRequest};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct AppState {
    pub auditor: Auditor,
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/scan", post(scan))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(bind: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Schema auditor listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Received Ctrl+C, shutting down");
}

pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Schema Auditor API",
        "endpoints": ["/scan"],
    }))
}

pub async fn health() -> &'static str {
    "OK"
}

/// Audit the submitted URL
pub async fn scan(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<AuditResult>, AuditError> {
    let Json(request) = body.map_err(|e| AuditError::Input(e.body_text()))?;
    let result = state.auditor.audit(&request.url).await?;
    Ok(Json(result))
}
