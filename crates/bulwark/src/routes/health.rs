//! Health check endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check (is the server running?)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ReadyResponse {
    status: &'static str,
    store: &'static str,
    provider: &'static str,
    secret_configured: bool,
    comments: usize,
}

/// Readiness check (is the credential store readable?)
///
/// A missing secret does not make the service unready; submissions are
/// rejected until one is configured.
pub async fn ready_check(
    State(state): State<AppState>,
) -> Result<Json<ReadyResponse>, StatusCode> {
    match state.credentials().await {
        Ok(credentials) => Ok(Json(ReadyResponse {
            status: "ready",
            store: state.store.backend(),
            provider: state.config.captcha.provider.name(),
            secret_configured: credentials.has_secret(),
            comments: state.comments.len().await,
        })),
        Err(err) => {
            tracing::warn!(error = %err, "Credential store not readable");
            // Return 503 if not ready
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
