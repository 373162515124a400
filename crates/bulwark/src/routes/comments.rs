//! Comment form and submission endpoints.
//!
//! Submission is the pre-save step of the host pipeline: nothing is
//! persisted unless the gate returns `Accepted`.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use axum::{
    Form, Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::Html,
};
use serde::Serialize;

use bulwark_common::constants::headers::X_FORWARDED_FOR;
use bulwark_common::{Comment, RejectReason, VerificationRequest, VerificationResult};

use super::ApiError;
use crate::comments::{CommentSubmission, render_comment_form};
use crate::state::AppState;

/// Path the rendered form posts to
pub const SUBMIT_PATH: &str = "/comments";

/// Render the comment form with the challenge widget
pub async fn comment_form(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let site_key = state.site_key().await?;
    if site_key.is_none() {
        tracing::warn!("No site key configured, rendering form without challenge widget");
    }

    Ok(Html(render_comment_form(
        state.config.captcha.provider,
        site_key.as_deref(),
        SUBMIT_PATH,
    )))
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl SubmissionResponse {
    fn accepted(comment_id: String) -> Self {
        Self {
            accepted: true,
            comment_id: Some(comment_id),
            reason: None,
            message: None,
        }
    }

    fn rejected(reason: &RejectReason) -> Self {
        Self {
            accepted: false,
            comment_id: None,
            reason: Some(reason.code()),
            message: Some(reason.user_message()),
        }
    }
}

/// Verify and, if accepted, store a comment
pub async fn submit_comment(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    let submission = CommentSubmission::from_form(&fields)?;

    let token = fields
        .get(state.config.captcha.provider.response_field())
        .cloned()
        .unwrap_or_default();
    let remote_address = client_address(peer, &headers, state.config.trust_forwarded_for);
    let request = VerificationRequest::new(token, remote_address);

    let result = match state.credentials().await {
        Ok(credentials) => state.gate.verify(&request, &credentials).await,
        Err(err) => {
            tracing::error!(error = %err, "Could not read credentials, rejecting submission");
            VerificationResult::Rejected(RejectReason::ConfigurationError)
        }
    };

    match result {
        VerificationResult::Accepted => {
            let comment = state
                .comments
                .append(submission, request.remote_address)
                .await;
            tracing::info!(comment_id = %comment.id, "Comment accepted");

            Ok((StatusCode::CREATED, Json(SubmissionResponse::accepted(comment.id))))
        }
        VerificationResult::Rejected(reason) => {
            tracing::info!(
                reason = reason.code(),
                remote = %request.remote_address,
                "Comment rejected"
            );
            let status =
                StatusCode::from_u16(reason.status_code()).unwrap_or(StatusCode::FORBIDDEN);

            Ok((status, Json(SubmissionResponse::rejected(&reason))))
        }
    }
}

/// List accepted comments
pub async fn list_comments(State(state): State<AppState>) -> Json<Vec<Comment>> {
    Json(state.comments.list().await)
}

/// The address reported to the provider as `remoteip`.
///
/// X-Forwarded-For is only honored when configured, and only its first
/// entry, and only if that entry parses as an IP address.
fn client_address(peer: SocketAddr, headers: &HeaderMap, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.ip().to_string()
}
