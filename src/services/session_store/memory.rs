//! Process-local session store on top of [`MemoryCache`].
//!
//! Sessions do not survive a restart and are not shared between instances.
//! One user may hold any number of live tokens.

use async_trait::async_trait;

use super::{SessionError, SessionStore};
use crate::services::memory_cache::MemoryCache;

#[derive(Clone)]
pub struct MemorySessionStore {
    cache: MemoryCache,
}

impl MemorySessionStore {
    /// `cache` carries the session TTL.
    pub fn new(cache: MemoryCache) -> Self {
        Self { cache }
    }

    /// Underlying cache, for the purge task.
    pub fn cache(&self) -> &MemoryCache {
        &self.cache
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, token: &str) -> Result<i64, SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyValue);
        }

        let value = self.cache.get(token).await.ok_or(SessionError::NotExists)?;
        value
            .parse::<i64>()
            .map_err(|e| SessionError::Corrupted(format!("{:?}: {}", value, e)))
    }

    async fn set(&self, token: &str, user_id: i64) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyValue);
        }

        self.cache.set(token, user_id.to_string()).await;
        Ok(())
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyValue);
        }

        if self.cache.remove(token).await {
            Ok(())
        } else {
            Err(SessionError::NotExists)
        }
    }
}
