//! Credential storage.
//!
//! Holds the site key and the secret key. Read on every form render and
//! every submission; written only through the admin settings surface.
//! Absence of a key is a normal state, not an error.

mod file;
mod memory;
mod redis_store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bulwark_common::{BulwarkError, CredentialKey, VerificationCredentials};

use crate::config::{StoreBackend, StoreConfig};

/// Key-value store for [`VerificationCredentials`].
///
/// Implementations perform no authorization and no caching. Setting an
/// empty value clears the key.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current value, or `None` if never configured
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, BulwarkError>;

    /// Administrative write; last write wins
    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), BulwarkError>;

    /// Backend name, for logs and readiness output
    fn backend(&self) -> &'static str;
}

/// Read both keys. Absent keys become empty strings; the gate rejects an
/// empty secret at use time.
pub async fn load_credentials(
    store: &dyn CredentialStore,
) -> Result<VerificationCredentials, BulwarkError> {
    let site_key = store.get(CredentialKey::SiteKey).await?.unwrap_or_default();
    let secret_key = store.get(CredentialKey::SecretKey).await?.unwrap_or_default();

    Ok(VerificationCredentials {
        site_key,
        secret_key,
    })
}

/// Open the backend named in configuration
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn CredentialStore>> {
    let store: Arc<dyn CredentialStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(FileStore::new(&config.path)),
        StoreBackend::Redis => Arc::new(
            RedisStore::connect(&config.redis_url)
                .await
                .context("Failed to connect to Redis credential store")?,
        ),
    };

    Ok(store)
}

/// Write startup-provided keys into the store. Keys not provided are left
/// as they are, so values set through the admin surface survive restarts.
pub async fn seed(
    store: &dyn CredentialStore,
    site_key: Option<&str>,
    secret_key: Option<&str>,
) -> Result<(), BulwarkError> {
    for (key, value) in [
        (CredentialKey::SiteKey, site_key),
        (CredentialKey::SecretKey, secret_key),
    ] {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            store.set(key, value).await?;
            tracing::info!(key = %key, backend = store.backend(), "Seeded credential from configuration");
        }
    }

    Ok(())
}

/// Empty or whitespace-only values mean "clear the key"
fn normalize(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_store_loads_empty_credentials() {
        let store = MemoryStore::new();
        let creds = load_credentials(&store).await.expect("load");
        assert!(!creds.has_secret());
        assert!(!creds.has_site_key());
    }

    #[tokio::test]
    async fn seed_skips_missing_values() {
        let store = MemoryStore::new();
        store.set(CredentialKey::SecretKey, "from-admin").await.expect("set");

        seed(&store, Some("site-1"), None).await.expect("seed");

        let creds = load_credentials(&store).await.expect("load");
        assert_eq!(creds.site_key, "site-1");
        assert_eq!(creds.secret_key, "from-admin");
    }

    #[test]
    fn normalize_trims_and_clears() {
        assert_eq!(normalize("  abc "), Some("abc"));
        assert_eq!(normalize("   "), None);
    }
}
