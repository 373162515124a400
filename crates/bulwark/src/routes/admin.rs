//! Admin settings endpoints.
//!
//! Reads and writes the two credentials through the store. Requires the
//! configured bearer token; the secret is write-only from here.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
    routing::get,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use bulwark_common::{BulwarkError, CaptchaProvider, CredentialKey};

use super::ApiError;
use crate::state::AppState;

/// Admin routes (credential settings)
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).post(update_settings))
}

/// The "manage configuration" capability check
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), BulwarkError> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        return Err(BulwarkError::Forbidden(
            "admin settings are disabled".to_string(),
        ));
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| BulwarkError::Unauthorized("missing bearer token".to_string()))?;

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        tracing::warn!("Rejected admin request with invalid token");
        Err(BulwarkError::Unauthorized("invalid admin token".to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    provider: CaptchaProvider,
    site_key: Option<String>,
    secret_configured: bool,
}

async fn current_settings(state: &AppState) -> Result<SettingsResponse, BulwarkError> {
    let credentials = state.credentials().await?;
    Ok(SettingsResponse {
        provider: state.config.captcha.provider,
        site_key: credentials
            .has_site_key()
            .then(|| credentials.site_key.clone()),
        secret_configured: credentials.has_secret(),
    })
}

async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SettingsResponse>, ApiError> {
    authorize(&state, &headers)?;
    Ok(Json(current_settings(&state).await?))
}

/// Absent fields are left unchanged; an empty string clears the key
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSettings {
    site_key: Option<String>,
    secret_key: Option<String>,
}

async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateSettings>,
) -> Result<Json<SettingsResponse>, ApiError> {
    authorize(&state, &headers)?;

    if payload.site_key.is_none() && payload.secret_key.is_none() {
        return Err(BulwarkError::InvalidInput("nothing to update".to_string()).into());
    }

    for (key, value) in [
        (CredentialKey::SiteKey, payload.site_key),
        (CredentialKey::SecretKey, payload.secret_key),
    ] {
        if let Some(value) = value {
            state.store.set(key, &value).await?;
            tracing::info!(key = %key, cleared = value.trim().is_empty(), "Credential updated");
        }
    }

    Ok(Json(current_settings(&state).await?))
}
