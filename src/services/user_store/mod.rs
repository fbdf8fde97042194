//! Durable user records and the read-through cache in front of them.

mod cached;
mod postgres;

pub use cached::CachedUserStore;
pub use postgres::PostgresUserStore;

use async_trait::async_trait;
use sea_orm::DbErr;
use secrecy::SecretString;

use crate::models::{Provider, ProviderToken, Repository, User};
use crate::services::cipher::CipherError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user not found")]
    UserNotFound,

    #[error("parameter is empty")]
    ParameterEmpty,

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    /// The transaction failed and rolling it back failed too.
    #[error("{source}; rollback failed: {rollback}")]
    Rollback {
        source: Box<StoreError>,
        rollback: DbErr,
    },

    #[error("failed to commit transaction: {0}")]
    Commit(DbErr),

    #[error("no provider token stored for user")]
    TokenNotFound,

    #[error("token cipher failed: {0}")]
    Cipher(#[from] CipherError),

    #[error("stored record is corrupted: {0}")]
    Corrupted(String),
}

/// Persistence contract for users, their statistics, repository snapshots
/// and encrypted provider tokens.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user row and return the new local id.
    async fn create_user(&self, user: &User) -> Result<i64, StoreError>;

    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError>;

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Authoritative lookup used by login. Never served from cache. Finds
    /// the user even when no statistics row exists for it yet.
    async fn get_user_by_provider_id(
        &self,
        provider: Provider,
        provider_id: i64,
    ) -> Result<User, StoreError>;

    async fn create_user_statistics(&self, user_id: i64, user: &User) -> Result<(), StoreError>;

    /// Overwrite statistics with a freshly fetched profile.
    async fn refresh_user_statistics(&self, user_id: i64, user: &User)
    -> Result<(), StoreError>;

    /// Append a repository snapshot. All rows are written or none are.
    async fn create_user_repository(
        &self,
        user_id: i64,
        repositories: &[Repository],
    ) -> Result<(), StoreError>;

    /// Repositories of the latest snapshot.
    async fn get_user_repository_by_user_id(
        &self,
        user_id: i64,
    ) -> Result<Vec<Repository>, StoreError>;

    /// Encrypt and upsert the provider token pair.
    async fn create_user_access_token(
        &self,
        user_id: i64,
        access_token: &SecretString,
        refresh_token: Option<&SecretString>,
    ) -> Result<(), StoreError>;

    async fn get_user_access_token(&self, user_id: i64) -> Result<ProviderToken, StoreError>;
}
