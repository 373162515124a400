//! Shared constants for Bulwark components.

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Default Redis connection URL (redis credential store)
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default path of the JSON credential file (file credential store)
pub const DEFAULT_STORE_PATH: &str = "data/credentials.json";

/// Upper bound on a single siteverify call
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 10;

/// Upper bound on a whole inbound request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Longest comment body accepted by the submission endpoint
pub const MAX_COMMENT_LEN: usize = 65_525;

/// Form fields of the siteverify request. Shared by every supported provider.
pub mod siteverify {
    pub const FIELD_SECRET: &str = "secret";
    pub const FIELD_RESPONSE: &str = "response";
    pub const FIELD_REMOTE_IP: &str = "remoteip";
}

/// Provider endpoints and widget wiring
pub mod providers {
    pub const HCAPTCHA_VERIFY_URL: &str = "https://api.hcaptcha.com/siteverify";
    pub const HCAPTCHA_SCRIPT_URL: &str = "https://js.hcaptcha.com/1/api.js";
    pub const HCAPTCHA_WIDGET_CLASS: &str = "h-captcha";
    pub const HCAPTCHA_RESPONSE_FIELD: &str = "h-captcha-response";

    pub const RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";
    pub const RECAPTCHA_SCRIPT_URL: &str = "https://www.google.com/recaptcha/api.js";
    pub const RECAPTCHA_WIDGET_CLASS: &str = "g-recaptcha";
    pub const RECAPTCHA_RESPONSE_FIELD: &str = "g-recaptcha-response";

    pub const TURNSTILE_VERIFY_URL: &str =
        "https://challenges.cloudflare.com/turnstile/v0/siteverify";
    pub const TURNSTILE_SCRIPT_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/api.js";
    pub const TURNSTILE_WIDGET_CLASS: &str = "cf-turnstile";
    pub const TURNSTILE_RESPONSE_FIELD: &str = "cf-turnstile-response";

    /// hCaptcha's published always-pass test site key
    pub const HCAPTCHA_TEST_SITE_KEY: &str = "10000000-ffff-ffff-ffff-000000000001";
    /// hCaptcha's published always-pass test secret
    pub const HCAPTCHA_TEST_SECRET_KEY: &str = "0x0000000000000000000000000000000000000000";
}

/// Redis key prefixes
pub mod redis_keys {
    /// Stored credential: bulwark:credentials:{site_key|secret_key}
    pub const CREDENTIALS_PREFIX: &str = "bulwark:credentials:";
}

/// HTTP header names
pub mod headers {
    /// Client address chain set by a reverse proxy
    pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
}
