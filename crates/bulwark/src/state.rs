//! Application state and shared resources.

use anyhow::{Context, Result};
use std::sync::Arc;

use bulwark_common::{BulwarkError, CredentialKey, VerificationCredentials};

use crate::comments::CommentLog;
use crate::config::AppConfig;
use crate::store::{self, CredentialStore};
use crate::verify::VerificationGate;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Where the site key and secret key live
    pub store: Arc<dyn CredentialStore>,

    /// Siteverify client
    pub gate: Arc<VerificationGate>,

    /// Accepted comments
    pub comments: Arc<CommentLog>,
}

impl AppState {
    /// Create application state: open the credential store, seed it from
    /// configuration, and build the gate's HTTP client
    pub async fn new(config: AppConfig) -> Result<Self> {
        let store = store::open(&config.store).await?;

        store::seed(
            store.as_ref(),
            config.captcha.site_key.as_deref(),
            config.captcha.secret_key.as_deref(),
        )
        .await
        .context("Failed to seed credential store")?;

        let gate = VerificationGate::new(config.captcha.verify_url(), config.captcha.timeout())
            .context("Failed to build verification gate")?;

        Ok(Self::from_parts(config, store, gate))
    }

    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn CredentialStore>,
        gate: VerificationGate,
    ) -> Self {
        Self {
            config,
            store,
            gate: Arc::new(gate),
            comments: Arc::new(CommentLog::new()),
        }
    }

    /// Current credentials, read fresh from the store
    pub async fn credentials(&self) -> Result<VerificationCredentials, BulwarkError> {
        store::load_credentials(self.store.as_ref()).await
    }

    /// Current public site key, if configured
    pub async fn site_key(&self) -> Result<Option<String>, BulwarkError> {
        self.store.get(CredentialKey::SiteKey).await
    }
}
