//! HTTP route handlers for Bulwark.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use bulwark_common::BulwarkError;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;

mod admin;
mod comments;
mod health;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout();

    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))

        // Comment pipeline
        .route("/comments/form", get(comments::comment_form))
        .route(
            comments::SUBMIT_PATH,
            get(comments::list_comments).post(comments::submit_comment),
        )

        // Credential settings (bearer token required)
        .nest("/admin", admin::admin_routes())

        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))

        // Add shared state
        .with_state(state)
}

/// JSON error response wrapping [`BulwarkError`]
#[derive(Debug)]
pub struct ApiError(BulwarkError);

impl From<BulwarkError> for ApiError {
    fn from(err: BulwarkError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server-side detail stays in the logs
        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
            "service unavailable".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
