//! Redis-backed credential store, for deployments running several Bulwark
//! instances against one set of keys.

use async_trait::async_trait;
use bulwark_common::constants::redis_keys::CREDENTIALS_PREFIX;
use bulwark_common::{BulwarkError, CredentialKey};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::{CredentialStore, normalize};

pub struct RedisStore {
    /// Redis connection manager (auto-reconnecting)
    redis: ConnectionManager,
}

impl RedisStore {
    /// Connect with a connection manager (handles reconnection)
    pub async fn connect(redis_url: &str) -> Result<Self, BulwarkError> {
        let client = redis::Client::open(redis_url).map_err(store_error)?;
        let redis = ConnectionManager::new(client).await.map_err(store_error)?;
        Ok(Self { redis })
    }
}

fn redis_key(key: CredentialKey) -> String {
    format!("{}{}", CREDENTIALS_PREFIX, key.as_str())
}

fn store_error(err: redis::RedisError) -> BulwarkError {
    BulwarkError::Store(format!("redis: {err}"))
}

#[async_trait]
impl CredentialStore for RedisStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, BulwarkError> {
        let mut conn = self.redis.clone();
        let value: Option<String> = conn.get(redis_key(key)).await.map_err(store_error)?;
        Ok(value.as_deref().and_then(normalize).map(str::to_string))
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), BulwarkError> {
        let mut conn = self.redis.clone();
        match normalize(value) {
            Some(value) => {
                let _: () = conn.set(redis_key(key), value).await.map_err(store_error)?;
            }
            None => {
                let _: () = conn.del(redis_key(key)).await.map_err(store_error)?;
            }
        }

        tracing::debug!(key = %key, "Credential written to Redis");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
