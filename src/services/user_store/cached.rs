//! Read-through cache in front of another [`UserStore`].
//!
//! Lookups by id, username and email and repository listings are served from
//! a [`MemoryCache`] when possible. Misses read the inner store and populate
//! the cache from a detached task, so a read never waits on the cache write.
//! Writes that change a cached record evict its keys.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{StoreError, UserStore};
use crate::models::{Provider, ProviderToken, Repository, User};
use crate::services::memory_cache::MemoryCache;

pub fn user_id_key(id: i64) -> String {
    format!("user:id:{}", id)
}

pub fn username_key(username: &str) -> String {
    format!("user:username:{}", username)
}

pub fn email_key(email: &str) -> String {
    format!("user:email:{}", email)
}

pub fn repository_key(user_id: i64) -> String {
    format!("user:repository:id:{}", user_id)
}

pub struct CachedUserStore<S> {
    inner: Arc<S>,
    cache: MemoryCache,
}

impl<S: UserStore + 'static> CachedUserStore<S> {
    pub fn new(inner: Arc<S>, cache: MemoryCache) -> Self {
        Self { inner, cache }
    }

    /// Cached value for `key`. Undecodable entries are evicted and treated as a miss.
    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.cache.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "User cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, "Evicting undecodable cache entry: {}", e);
                self.cache.remove(key).await;
                None
            }
        }
    }

    /// Schedule a cache write without waiting for it.
    fn populate<T: Serialize>(&self, key: String, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(key = %key, "Failed to encode cache entry: {}", e);
                return;
            }
        };

        let cache = self.cache.clone();
        tokio::spawn(async move {
            cache.set(key, encoded).await;
        });
    }

    /// Evict every key of the user. Keys are derived from both the incoming
    /// profile and the record cached under the id, so a renamed user loses
    /// the entries filed under the old username and email.
    async fn evict_user(&self, user_id: i64, user: &User) {
        let id_key = user_id_key(user_id);
        if let Some(previous) = self.cached::<User>(&id_key).await {
            self.evict_lookup_keys(&previous).await;
        }
        self.cache.remove(&id_key).await;
        self.evict_lookup_keys(user).await;
    }

    async fn evict_lookup_keys(&self, user: &User) {
        self.cache.remove(&username_key(&user.username)).await;
        if let Some(ref email) = user.email {
            self.cache.remove(&email_key(email)).await;
        }
    }
}

#[async_trait]
impl<S: UserStore + 'static> UserStore for CachedUserStore<S> {
    async fn create_user(&self, user: &User) -> Result<i64, StoreError> {
        self.inner.create_user(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError> {
        let key = user_id_key(id);
        if let Some(user) = self.cached(&key).await {
            return Ok(user);
        }

        let user = self.inner.get_user_by_id(id).await?;
        self.populate(key, &user);
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        if username.is_empty() {
            return Err(StoreError::ParameterEmpty);
        }

        let key = username_key(username);
        if let Some(user) = self.cached(&key).await {
            return Ok(user);
        }

        let user = self.inner.get_user_by_username(username).await?;
        self.populate(key, &user);
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        if email.is_empty() {
            return Err(StoreError::ParameterEmpty);
        }

        let key = email_key(email);
        if let Some(user) = self.cached(&key).await {
            return Ok(user);
        }

        let user = self.inner.get_user_by_email(email).await?;
        self.populate(key, &user);
        Ok(user)
    }

    async fn get_user_by_provider_id(
        &self,
        provider: Provider,
        provider_id: i64,
    ) -> Result<User, StoreError> {
        self.inner
            .get_user_by_provider_id(provider, provider_id)
            .await
    }

    async fn create_user_statistics(&self, user_id: i64, user: &User) -> Result<(), StoreError> {
        self.inner.create_user_statistics(user_id, user).await?;
        self.evict_user(user_id, user).await;
        Ok(())
    }

    async fn refresh_user_statistics(
        &self,
        user_id: i64,
        user: &User,
    ) -> Result<(), StoreError> {
        self.inner.refresh_user_statistics(user_id, user).await?;
        self.evict_user(user_id, user).await;
        Ok(())
    }

    async fn create_user_repository(
        &self,
        user_id: i64,
        repositories: &[Repository],
    ) -> Result<(), StoreError> {
        self.inner
            .create_user_repository(user_id, repositories)
            .await?;
        self.cache.remove(&repository_key(user_id)).await;
        Ok(())
    }

    async fn get_user_repository_by_user_id(
        &self,
        user_id: i64,
    ) -> Result<Vec<Repository>, StoreError> {
        let key = repository_key(user_id);
        if let Some(repositories) = self.cached(&key).await {
            return Ok(repositories);
        }

        let repositories = self.inner.get_user_repository_by_user_id(user_id).await?;
        self.populate(key, &repositories);
        Ok(repositories)
    }

    async fn create_user_access_token(
        &self,
        user_id: i64,
        access_token: &SecretString,
        refresh_token: Option<&SecretString>,
    ) -> Result<(), StoreError> {
        self.inner
            .create_user_access_token(user_id, access_token, refresh_token)
            .await
    }

    async fn get_user_access_token(&self, user_id: i64) -> Result<ProviderToken, StoreError> {
        self.inner.get_user_access_token(user_id).await
    }
}
