//! The submission verification gate.
//!
//! One call, one outbound siteverify POST, one verdict. Every failure mode
//! resolves to [`VerificationResult::Rejected`]: the gate fails closed and
//! never surfaces an error to its caller.

use std::time::Duration;

use bulwark_common::constants::siteverify::{FIELD_REMOTE_IP, FIELD_RESPONSE, FIELD_SECRET};
use bulwark_common::{
    RejectReason, SiteVerifyResponse, VerificationCredentials, VerificationRequest,
    VerificationResult,
};
use reqwest::Client;
use thiserror::Error;

/// Errors building a [`VerificationGate`]
#[derive(Debug, Error)]
pub enum GateError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Decides whether an inbound submission may proceed
pub struct VerificationGate {
    client: Client,
    verify_url: String,
}

impl VerificationGate {
    /// Create a gate whose outbound call is bounded by `timeout`
    pub fn new(verify_url: impl Into<String>, timeout: Duration) -> Result<Self, GateError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bulwark/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, verify_url))
    }

    pub fn with_client(client: Client, verify_url: impl Into<String>) -> Self {
        Self {
            client,
            verify_url: verify_url.into(),
        }
    }

    pub fn verify_url(&self) -> &str {
        &self.verify_url
    }

    /// Verify a challenge token against the provider.
    ///
    /// Makes no network call when the secret or the token is missing.
    /// Never retries and never memoizes by token: each call is exactly one
    /// attempt, and reuse policy is the provider's business.
    pub async fn verify(
        &self,
        request: &VerificationRequest,
        credentials: &VerificationCredentials,
    ) -> VerificationResult {
        if !credentials.has_secret() {
            tracing::error!(
                remote = %request.remote_address,
                "Secret key is not configured, rejecting submission"
            );
            return VerificationResult::Rejected(RejectReason::ConfigurationError);
        }

        if request.token.trim().is_empty() {
            tracing::debug!(remote = %request.remote_address, "Submission carried no challenge token");
            return VerificationResult::Rejected(RejectReason::MissingToken);
        }

        match self.siteverify(request, &credentials.secret_key).await {
            Ok(response) if response.success => {
                tracing::info!(
                    remote = %request.remote_address,
                    hostname = ?response.hostname,
                    "Challenge verified"
                );
                VerificationResult::Accepted
            }
            Ok(response) => {
                if response.error_codes.iter().any(|code| code.is_configuration_fault()) {
                    tracing::error!(
                        codes = ?response.error_codes,
                        "Provider rejected our credentials, check the configured keys"
                    );
                } else {
                    tracing::info!(
                        remote = %request.remote_address,
                        codes = ?response.error_codes,
                        "Challenge verification failed"
                    );
                }
                VerificationResult::Rejected(RejectReason::VerificationFailed {
                    error_codes: response.error_codes,
                })
            }
            Err(err) => {
                tracing::warn!(
                    remote = %request.remote_address,
                    timeout = err.is_timeout(),
                    status = ?err.status(),
                    error = %err,
                    "Siteverify call failed"
                );
                VerificationResult::Rejected(RejectReason::TransportError)
            }
        }
    }

    async fn siteverify(
        &self,
        request: &VerificationRequest,
        secret: &str,
    ) -> Result<SiteVerifyResponse, reqwest::Error> {
        let mut params = vec![(FIELD_SECRET, secret), (FIELD_RESPONSE, request.token.as_str())];
        if !request.remote_address.is_empty() {
            params.push((FIELD_REMOTE_IP, request.remote_address.as_str()));
        }

        self.client
            .post(&self.verify_url)
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<SiteVerifyResponse>()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{REFUSED_URL, Reply, spawn_provider};
    use axum::http::StatusCode;
    use bulwark_common::ProviderErrorCode;
    use serde_json::json;

    fn gate(url: &str) -> VerificationGate {
        VerificationGate::new(url, Duration::from_secs(2)).expect("gate")
    }

    fn creds(secret: &str) -> VerificationCredentials {
        VerificationCredentials::new("site-key", secret)
    }

    #[tokio::test]
    async fn accepts_when_provider_reports_success() {
        let provider = spawn_provider(Reply::Json(json!({ "success": true }))).await;
        let request = VerificationRequest::new("valid-token", "203.0.113.7");

        let result = gate(&provider.url).verify(&request, &creds("abc")).await;

        assert_eq!(result, VerificationResult::Accepted);
        assert_eq!(provider.calls(), 1);

        let form = provider.last_form().expect("form");
        assert_eq!(form.get("secret").map(String::as_str), Some("abc"));
        assert_eq!(form.get("response").map(String::as_str), Some("valid-token"));
        assert_eq!(form.get("remoteip").map(String::as_str), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn rejects_when_provider_reports_failure() {
        let provider = spawn_provider(Reply::Json(json!({
            "success": false,
            "error-codes": ["invalid-input-response"]
        })))
        .await;
        let request = VerificationRequest::new("bad-token", "203.0.113.7");

        let result = gate(&provider.url).verify(&request, &creds("abc")).await;

        assert_eq!(
            result,
            VerificationResult::Rejected(RejectReason::VerificationFailed {
                error_codes: vec![ProviderErrorCode::InvalidResponse],
            })
        );
        assert_eq!(result.reject_reason().map(|r| r.code()), Some("verification_failed"));
    }

    #[tokio::test]
    async fn empty_secret_fails_closed_without_calling_out() {
        let provider = spawn_provider(Reply::Json(json!({ "success": true }))).await;
        let request = VerificationRequest::new("valid-token", "203.0.113.7");

        let result = gate(&provider.url).verify(&request, &creds("")).await;

        assert_eq!(
            result,
            VerificationResult::Rejected(RejectReason::ConfigurationError)
        );
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn empty_token_is_rejected_locally() {
        let provider = spawn_provider(Reply::Json(json!({ "success": true }))).await;
        let request = VerificationRequest::new("  ", "203.0.113.7");

        let result = gate(&provider.url).verify(&request, &creds("abc")).await;

        assert_eq!(result, VerificationResult::Rejected(RejectReason::MissingToken));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let request = VerificationRequest::new("valid-token", "203.0.113.7");

        let result = gate(REFUSED_URL).verify(&request, &creds("abc")).await;

        assert_eq!(result, VerificationResult::Rejected(RejectReason::TransportError));
    }

    #[tokio::test]
    async fn timeout_is_a_transport_error() {
        let provider = spawn_provider(Reply::Stall(Duration::from_secs(5))).await;
        let gate = VerificationGate::new(&provider.url, Duration::from_millis(200)).expect("gate");
        let request = VerificationRequest::new("valid-token", "203.0.113.7");

        let result = gate.verify(&request, &creds("abc")).await;

        assert_eq!(result, VerificationResult::Rejected(RejectReason::TransportError));
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let provider = spawn_provider(Reply::Status(StatusCode::BAD_GATEWAY)).await;
        let request = VerificationRequest::new("valid-token", "203.0.113.7");

        let result = gate(&provider.url).verify(&request, &creds("abc")).await;

        assert_eq!(result, VerificationResult::Rejected(RejectReason::TransportError));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_a_transport_error() {
        let provider = spawn_provider(Reply::Garbage).await;
        let request = VerificationRequest::new("valid-token", "203.0.113.7");

        let result = gate(&provider.url).verify(&request, &creds("abc")).await;

        assert_eq!(result, VerificationResult::Rejected(RejectReason::TransportError));
    }

    #[tokio::test]
    async fn same_token_is_sent_every_time() {
        let provider = spawn_provider(Reply::Json(json!({ "success": true }))).await;
        let gate = gate(&provider.url);
        let request = VerificationRequest::new("reused-token", "203.0.113.7");

        gate.verify(&request, &creds("abc")).await;
        gate.verify(&request, &creds("abc")).await;

        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn remote_ip_is_omitted_when_unknown() {
        let provider = spawn_provider(Reply::Json(json!({ "success": true }))).await;
        let request = VerificationRequest::new("valid-token", "");

        let result = gate(&provider.url).verify(&request, &creds("abc")).await;

        assert!(result.is_accepted());
        let form = provider.last_form().expect("form");
        assert!(!form.contains_key("remoteip"));
    }
}
