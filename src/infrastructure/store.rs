//! Key-value backends holding the currently valid session tokens.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{background_task::start_purge_task, errors::StoreError, settings::AppConfig};

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Writes `value` under `key`, replacing any previous value.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Writes only when `key` is absent; returns whether the write happened.
    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn del(&self, keys: &[String]) -> Result<(), StoreError>;

    /// Deletes `key` only while it still holds `expected`; returns whether it did.
    async fn del_if_eq(&self, key: &str, expected: &str) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Redis when a URL is configured, otherwise the process-local store.
pub fn build_store(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    match config.redis_url.as_deref() {
        Some(url) => {
            tracing::info!("Using Redis session store");
            Ok(Arc::new(RedisStore::from_url(url)?))
        }
        None => {
            tracing::warn!("APP_REDIS_URL not set; sessions are kept in process memory");
            let store = MemoryStore::new();
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(start_purge_task(store.clone()));
                }
                Err(_) => tracing::warn!("No async runtime; expired session entries are only dropped on read"),
            }
            Ok(Arc::new(store))
        }
    }
}
