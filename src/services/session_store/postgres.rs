//! Durable session store backed by the `user_sessions` table.
//!
//! Each user holds at most one durable session: setting a new token for a
//! user replaces the old one. Only SHA-256 hashes of tokens are stored.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{SessionError, SessionStore};
use crate::db::{DbPool, user_sessions};

#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: DbPool,
    ttl: Duration,
}

impl PostgresSessionStore {
    pub fn new(pool: DbPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Delete expired rows. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<u64, SessionError> {
        Ok(user_sessions::delete_expired(self.pool.connection()).await?)
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn get(&self, token: &str) -> Result<i64, SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyValue);
        }

        let hash = user_sessions::hash_token(token);
        user_sessions::find_valid_by_hash(self.pool.connection(), &hash)
            .await?
            .ok_or(SessionError::NotExists)
    }

    async fn set(&self, token: &str, user_id: i64) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyValue);
        }

        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| SessionError::Corrupted(format!("session ttl out of range: {}", e)))?;
        let hash = user_sessions::hash_token(token);
        user_sessions::upsert(self.pool.connection(), user_id, &hash, Utc::now() + ttl).await?;
        Ok(())
    }

    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyValue);
        }

        let hash = user_sessions::hash_token(token);
        if user_sessions::delete_by_hash(self.pool.connection(), &hash).await? {
            Ok(())
        } else {
            Err(SessionError::NotExists)
        }
    }
}
