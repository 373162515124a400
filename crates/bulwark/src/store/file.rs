//! JSON-file credential store.
//!
//! The whole document is re-read on every `get`, so edits made by another
//! process are picked up without a restart. Writes go to a temp file that
//! is renamed over the original.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bulwark_common::{BulwarkError, CredentialKey};
use tokio::sync::Mutex;

use super::{CredentialStore, normalize};

type Document = BTreeMap<String, String>;

pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> Result<Document, BulwarkError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Document::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Document::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_document(&self, document: &Document) -> Result<(), BulwarkError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let body = serde_json::to_vec_pretty(document)
            .map_err(|e| BulwarkError::Internal(e.to_string()))?;
        tokio::fs::write(&tmp, body).await?;

        // Holds the secret key: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, BulwarkError> {
        let document = self.read_document().await?;
        Ok(document
            .get(key.as_str())
            .and_then(|v| normalize(v))
            .map(str::to_string))
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), BulwarkError> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.read_document().await?;
        match normalize(value) {
            Some(value) => document.insert(key.as_str().to_string(), value.to_string()),
            None => document.remove(key.as_str()),
        };
        self.write_document(&document).await?;

        tracing::debug!(key = %key, path = %self.path.display(), "Credential written");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn missing_file_reads_as_unconfigured() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(assert_ok!(store.get(CredentialKey::SecretKey).await), None);
    }

    #[tokio::test]
    async fn values_survive_a_new_handle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileStore::new(&path);
        assert_ok!(store.set(CredentialKey::SiteKey, "site-abc").await);
        assert_ok!(store.set(CredentialKey::SecretKey, "secret-xyz").await);

        let reopened = FileStore::new(&path);
        assert_eq!(
            assert_ok!(reopened.get(CredentialKey::SiteKey).await).as_deref(),
            Some("site-abc")
        );
        assert_eq!(
            assert_ok!(reopened.get(CredentialKey::SecretKey).await).as_deref(),
            Some("secret-xyz")
        );
    }

    #[tokio::test]
    async fn clearing_a_key_leaves_the_other() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("credentials.json"));
        assert_ok!(store.set(CredentialKey::SiteKey, "site").await);
        assert_ok!(store.set(CredentialKey::SecretKey, "secret").await);

        assert_ok!(store.set(CredentialKey::SecretKey, " ").await);

        assert_eq!(assert_ok!(store.get(CredentialKey::SecretKey).await), None);
        assert_eq!(
            assert_ok!(store.get(CredentialKey::SiteKey).await).as_deref(),
            Some("site")
        );
    }

    #[tokio::test]
    async fn corrupt_document_is_a_store_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");
        tokio::fs::write(&path, b"{not json").await.expect("write");

        let store = FileStore::new(&path);
        let err = assert_err!(store.get(CredentialKey::SiteKey).await);
        assert!(matches!(err, BulwarkError::Store(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn document_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");
        let store = FileStore::new(&path);
        assert_ok!(store.set(CredentialKey::SecretKey, "secret").await);

        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
