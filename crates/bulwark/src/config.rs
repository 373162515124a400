//! Configuration management for Bulwark.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use bulwark_common::CaptchaProvider;
use bulwark_common::constants::{
    DEFAULT_LISTEN_ADDR, DEFAULT_REDIS_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STORE_PATH,
    DEFAULT_VERIFY_TIMEOUT_SECS,
};

/// Application configuration. Holds secrets; not `Debug`.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Bearer token required by the admin settings routes. Unset disables them.
    #[serde(default)]
    pub admin_token: Option<String>,

    /// Take the client address from X-Forwarded-For (only behind a trusted proxy)
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// Upper bound on a whole inbound request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Challenge provider configuration
    #[serde(default)]
    pub captcha: CaptchaConfig,

    /// Credential store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

/// Challenge provider configuration
#[derive(Clone, Deserialize)]
pub struct CaptchaConfig {
    /// Which service issues and validates tokens
    #[serde(default)]
    pub provider: CaptchaProvider,

    /// Site key written into the store at startup, if set
    #[serde(default)]
    pub site_key: Option<String>,

    /// Secret key written into the store at startup, if set
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Siteverify endpoint override, for pointing at a local test double
    #[serde(default)]
    pub verify_url: Option<String>,

    /// Upper bound on a single siteverify call
    #[serde(default = "default_verify_timeout")]
    pub timeout_secs: u64,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            provider: CaptchaProvider::default(),
            site_key: None,
            secret_key: None,
            verify_url: None,
            timeout_secs: default_verify_timeout(),
        }
    }
}

impl CaptchaConfig {
    /// The provider's fixed endpoint unless overridden
    pub fn verify_url(&self) -> &str {
        self.verify_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.provider.verify_url())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Credential store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
    Redis,
}

/// Credential store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// JSON document path (file backend)
    #[serde(default = "default_store_path")]
    pub path: String,

    /// Redis connection URL (redis backend)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
            redis_url: default_redis_url(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_redis_url() -> String { DEFAULT_REDIS_URL.to_string() }
fn default_store_path() -> String { DEFAULT_STORE_PATH.to_string() }
fn default_verify_timeout() -> u64 { DEFAULT_VERIFY_TIMEOUT_SECS }
fn default_request_timeout() -> u64 { DEFAULT_REQUEST_TIMEOUT_SECS }

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref redis_url) = args.redis_url {
            config.store.redis_url = redis_url.clone();
        }
        if let Some(ref site_key) = args.site_key {
            config.captcha.site_key = Some(site_key.clone());
        }
        if let Some(ref secret_key) = args.secret_key {
            config.captcha.secret_key = Some(secret_key.clone());
        }
        if let Some(ref admin_token) = args.admin_token {
            config.admin_token = Some(admin_token.clone());
        }

        if config.admin_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            config.admin_token = None;
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            admin_token: None,
            trust_forwarded_for: false,
            request_timeout_secs: default_request_timeout(),
            captcha: CaptchaConfig::default(),
            store: StoreConfig::default(),
        }
    }
}
