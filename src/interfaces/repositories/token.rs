use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    constants::{ACCESS_TOKEN_PREFIX, REFRESH_LOCK_PREFIX, REFRESH_LOCK_TTL_SECS, REFRESH_TOKEN_PREFIX},
    errors::AuthError,
    repositories::kv_repo::KvTokenRepo,
    settings::TokenTtls,
    store::KeyValueStore,
};


/// Records the one currently valid access and refresh token per identity.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn store_access(&self, user_id: i64, user_type: &str, token: &str) -> Result<(), AuthError>;
    async fn store_refresh(&self, user_id: i64, user_type: &str, token: &str) -> Result<(), AuthError>;

    /// Stores both tokens; a failed refresh write removes the access entry again.
    async fn store_token_pair(&self, user_id: i64, user_type: &str, access: &str, refresh: &str) -> Result<(), AuthError>;

    async fn validate_access(&self, user_id: i64, user_type: &str, token: &str) -> Result<(), AuthError>;
    async fn validate_refresh(&self, user_id: i64, user_type: &str, token: &str) -> Result<(), AuthError>;
    async fn delete_tokens(&self, user_id: i64, user_type: &str) -> Result<(), AuthError>;

    /// Claims the per-identity refresh lock and returns its owner token;
    /// None when another rotation holds it.
    async fn lock_refresh(&self, user_id: i64, user_type: &str) -> Result<Option<String>, AuthError>;

    /// Releases the lock only while it is still held under `lock_token`.
    async fn unlock_refresh(&self, user_id: i64, user_type: &str, lock_token: &str) -> Result<(), AuthError>;

    async fn check_connection(&self) -> Result<(), AuthError>;
}

pub fn access_key(user_id: i64, user_type: &str) -> String {
    format!("{ACCESS_TOKEN_PREFIX}:{user_id}:{user_type}")
}

pub fn refresh_key(user_id: i64, user_type: &str) -> String {
    format!("{REFRESH_TOKEN_PREFIX}:{user_id}:{user_type}")
}

pub fn refresh_lock_key(user_id: i64, user_type: &str) -> String {
    format!("{REFRESH_LOCK_PREFIX}:{user_id}:{user_type}")
}

impl KvTokenRepo {
    pub fn new(store: Arc<dyn KeyValueStore>, ttls: TokenTtls) -> Self {
        KvTokenRepo { store, ttls }
    }

    /// Ok only when a stored value exists and equals the presented token.
    async fn matches_stored(&self, key: &str, token: &str) -> Result<bool, AuthError> {
        let stored = self.store.get(key).await?;
        Ok(stored.as_deref() == Some(token))
    }
}

#[async_trait]
impl TokenRepository for KvTokenRepo {
    async fn store_access(&self, user_id: i64, user_type: &str, token: &str) -> Result<(), AuthError> {
        let ttl = self.ttls.access()?;
        self.store
            .set_ex(&access_key(user_id, user_type), token, ttl)
            .await
            .map_err(AuthError::from)
    }

    async fn store_refresh(&self, user_id: i64, user_type: &str, token: &str) -> Result<(), AuthError> {
        let ttl = self.ttls.refresh()?;
        self.store
            .set_ex(&refresh_key(user_id, user_type), token, ttl)
            .await
            .map_err(AuthError::from)
    }

    async fn store_token_pair(&self, user_id: i64, user_type: &str, access: &str, refresh: &str) -> Result<(), AuthError> {
        self.store_access(user_id, user_type, access).await?;

        if let Err(e) = self.store_refresh(user_id, user_type, refresh).await {
            tracing::warn!(user_id, user_type, "Refresh token write failed, rolling back access token: {}", e);

            if let Err(rollback) = self.delete_tokens(user_id, user_type).await {
                tracing::error!(user_id, user_type, "Rollback of access token failed: {}", rollback);
            }
            return Err(e);
        }

        Ok(())
    }

    async fn validate_access(&self, user_id: i64, user_type: &str, token: &str) -> Result<(), AuthError> {
        if self.matches_stored(&access_key(user_id, user_type), token).await? {
            Ok(())
        } else {
            Err(AuthError::TokenRevoked)
        }
    }

    async fn validate_refresh(&self, user_id: i64, user_type: &str, token: &str) -> Result<(), AuthError> {
        if self.matches_stored(&refresh_key(user_id, user_type), token).await? {
            Ok(())
        } else {
            Err(AuthError::RefreshTokenNotFound)
        }
    }

    async fn delete_tokens(&self, user_id: i64, user_type: &str) -> Result<(), AuthError> {
        let keys = [access_key(user_id, user_type), refresh_key(user_id, user_type)];
        self.store.del(&keys).await.map_err(AuthError::from)
    }

    async fn lock_refresh(&self, user_id: i64, user_type: &str) -> Result<Option<String>, AuthError> {
        let lock_token = Uuid::new_v4().to_string();
        let acquired = self.store
            .set_nx_ex(
                &refresh_lock_key(user_id, user_type),
                &lock_token,
                Duration::from_secs(REFRESH_LOCK_TTL_SECS),
            )
            .await?;

        Ok(acquired.then_some(lock_token))
    }

    async fn unlock_refresh(&self, user_id: i64, user_type: &str, lock_token: &str) -> Result<(), AuthError> {
        let released = self.store
            .del_if_eq(&refresh_lock_key(user_id, user_type), lock_token)
            .await?;

        if !released {
            tracing::warn!(user_id, user_type, "Refresh lock expired before release");
        }
        Ok(())
    }

    async fn check_connection(&self) -> Result<(), AuthError> {
        self.store.ping().await.map_err(AuthError::from)
    }
}
