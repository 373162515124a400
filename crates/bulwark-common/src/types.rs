//! Core types shared across Bulwark components.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::providers;

/// Third-party anti-abuse service that issues and validates challenge tokens.
///
/// All three speak the same siteverify dialect: a form-encoded POST of
/// `secret`, `response` and `remoteip`, answered with a JSON object carrying
/// a boolean `success` and optional `error-codes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptchaProvider {
    #[default]
    HCaptcha,
    ReCaptcha,
    Turnstile,
}

impl CaptchaProvider {
    pub fn name(&self) -> &'static str {
        match self {
            Self::HCaptcha => "hcaptcha",
            Self::ReCaptcha => "recaptcha",
            Self::Turnstile => "turnstile",
        }
    }

    /// Fixed siteverify endpoint
    pub fn verify_url(&self) -> &'static str {
        match self {
            Self::HCaptcha => providers::HCAPTCHA_VERIFY_URL,
            Self::ReCaptcha => providers::RECAPTCHA_VERIFY_URL,
            Self::Turnstile => providers::TURNSTILE_VERIFY_URL,
        }
    }

    /// Script that renders the client-side widget
    pub fn script_url(&self) -> &'static str {
        match self {
            Self::HCaptcha => providers::HCAPTCHA_SCRIPT_URL,
            Self::ReCaptcha => providers::RECAPTCHA_SCRIPT_URL,
            Self::Turnstile => providers::TURNSTILE_SCRIPT_URL,
        }
    }

    /// CSS class the widget script looks for
    pub fn widget_class(&self) -> &'static str {
        match self {
            Self::HCaptcha => providers::HCAPTCHA_WIDGET_CLASS,
            Self::ReCaptcha => providers::RECAPTCHA_WIDGET_CLASS,
            Self::Turnstile => providers::TURNSTILE_WIDGET_CLASS,
        }
    }

    /// Form field the widget fills with its response token
    pub fn response_field(&self) -> &'static str {
        match self {
            Self::HCaptcha => providers::HCAPTCHA_RESPONSE_FIELD,
            Self::ReCaptcha => providers::RECAPTCHA_RESPONSE_FIELD,
            Self::Turnstile => providers::TURNSTILE_RESPONSE_FIELD,
        }
    }
}

impl fmt::Display for CaptchaProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names under which the credential store keeps its two values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKey {
    /// Public, embedded in rendered markup
    SiteKey,
    /// Private, only ever sent to the siteverify endpoint
    SecretKey,
}

impl CredentialKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SiteKey => "site_key",
            Self::SecretKey => "secret_key",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Site key and secret key as configured by an administrator.
///
/// Not `Serialize`: nothing rendered to a client may hold the secret.
/// `Debug` redacts it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct VerificationCredentials {
    pub site_key: String,
    pub secret_key: String,
}

impl VerificationCredentials {
    pub fn new(site_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            site_key: site_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// An empty secret is a configuration error, checked at use time
    pub fn has_secret(&self) -> bool {
        !self.secret_key.trim().is_empty()
    }

    pub fn has_site_key(&self) -> bool {
        !self.site_key.trim().is_empty()
    }
}

impl fmt::Debug for VerificationCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationCredentials")
            .field("site_key", &self.site_key)
            .field(
                "secret_key",
                &if self.has_secret() { "<redacted>" } else { "<empty>" },
            )
            .finish()
    }
}

/// One submission's challenge token and source address. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Opaque token produced by the client-side widget
    pub token: String,
    /// Network-layer source address of the submitting client
    pub remote_address: String,
}

impl VerificationRequest {
    pub fn new(token: impl Into<String>, remote_address: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            remote_address: remote_address.into(),
        }
    }
}

/// Error codes reported in a siteverify `error-codes` array.
///
/// Unknown codes are kept verbatim so a provider adding a code never turns a
/// parseable response into a transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderErrorCode {
    MissingSecret,
    InvalidSecret,
    MissingResponse,
    InvalidResponse,
    BadRequest,
    DuplicateResponse,
    TimeoutOrDuplicate,
    SitekeySecretMismatch,
    InternalError,
    Other(String),
}

impl ProviderErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MissingSecret => "missing-input-secret",
            Self::InvalidSecret => "invalid-input-secret",
            Self::MissingResponse => "missing-input-response",
            Self::InvalidResponse => "invalid-input-response",
            Self::BadRequest => "bad-request",
            Self::DuplicateResponse => "invalid-or-already-seen-response",
            Self::TimeoutOrDuplicate => "timeout-or-duplicate",
            Self::SitekeySecretMismatch => "sitekey-secret-mismatch",
            Self::InternalError => "internal-error",
            Self::Other(code) => code,
        }
    }

    /// Codes that point at the server's own credentials rather than the user
    pub fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            Self::MissingSecret | Self::InvalidSecret | Self::SitekeySecretMismatch
        )
    }
}

impl From<String> for ProviderErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "missing-input-secret" => Self::MissingSecret,
            "invalid-input-secret" => Self::InvalidSecret,
            "missing-input-response" => Self::MissingResponse,
            "invalid-input-response" => Self::InvalidResponse,
            "bad-request" => Self::BadRequest,
            "invalid-or-already-seen-response" => Self::DuplicateResponse,
            "timeout-or-duplicate" => Self::TimeoutOrDuplicate,
            "sitekey-secret-mismatch" => Self::SitekeySecretMismatch,
            "internal-error" => Self::InternalError,
            _ => Self::Other(code),
        }
    }
}

impl From<ProviderErrorCode> for String {
    fn from(code: ProviderErrorCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a siteverify response. Only `success` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteVerifyResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_ts: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// hCaptcha only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<bool>,

    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<ProviderErrorCode>,
}

/// Why a submission was turned away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No secret configured, or the credential store was unreadable
    ConfigurationError,
    /// The submission carried no challenge token
    MissingToken,
    /// The provider could not be reached or answered with garbage
    TransportError,
    /// The provider explicitly refused the token
    VerificationFailed { error_codes: Vec<ProviderErrorCode> },
}

impl RejectReason {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigurationError => "configuration_error",
            Self::MissingToken => "missing_token",
            Self::TransportError => "transport_error",
            Self::VerificationFailed { .. } => "verification_failed",
        }
    }

    /// Message safe to show the person who submitted the comment
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ConfigurationError => {
                "Comments are temporarily unavailable. Please try again later."
            }
            Self::MissingToken => "Please complete the human verification challenge.",
            Self::TransportError => {
                "We could not verify that you are human right now. Please try again."
            }
            Self::VerificationFailed { .. } => {
                "Human verification failed. Please complete the challenge and try again."
            }
        }
    }

    /// HTTP status used when surfacing this rejection
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ConfigurationError => 503,
            Self::MissingToken => 400,
            Self::TransportError => 503,
            Self::VerificationFailed { .. } => 403,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of the verification gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Accepted,
    Rejected(RejectReason),
}

impl VerificationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            Self::Accepted => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

/// A comment that passed verification and was persisted
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub content: String,
    /// Kept for moderation, never listed publicly
    #[serde(skip_serializing)]
    pub remote_address: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
