//! In-process credential store.

use std::collections::HashMap;

use async_trait::async_trait;
use bulwark_common::{BulwarkError, CredentialKey};
use tokio::sync::RwLock;

use super::{CredentialStore, normalize};

/// Credentials held in memory for the life of the process
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<CredentialKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, BulwarkError> {
        Ok(self.values.read().await.get(&key).cloned())
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), BulwarkError> {
        let mut values = self.values.write().await;
        match normalize(value) {
            Some(value) => values.insert(key, value.to_string()),
            None => values.remove(&key),
        };
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn missing_key_is_none_not_error() {
        let store = MemoryStore::new();
        assert_eq!(assert_ok!(store.get(CredentialKey::SiteKey).await), None);
    }

    #[tokio::test]
    async fn last_write_wins_and_empty_clears() {
        let store = MemoryStore::new();
        assert_ok!(store.set(CredentialKey::SecretKey, "first").await);
        assert_ok!(store.set(CredentialKey::SecretKey, "second").await);
        assert_eq!(
            assert_ok!(store.get(CredentialKey::SecretKey).await).as_deref(),
            Some("second")
        );

        assert_ok!(store.set(CredentialKey::SecretKey, "").await);
        assert_eq!(assert_ok!(store.get(CredentialKey::SecretKey).await), None);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let store = MemoryStore::new();
        assert_ok!(store.set(CredentialKey::SiteKey, "public").await);
        assert_eq!(assert_ok!(store.get(CredentialKey::SecretKey).await), None);
    }
}
