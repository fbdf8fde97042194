//! Application session storage: opaque access token to user id.

mod memory;
mod postgres;

pub use memory::MemorySessionStore;
pub use postgres::PostgresSessionStore;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session token is empty")]
    EmptyValue,

    #[error("session does not exist")]
    NotExists,

    #[error("stored session value is corrupted: {0}")]
    Corrupted(String),

    #[error("session database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// User id the token belongs to.
    async fn get(&self, token: &str) -> Result<i64, SessionError>;

    /// Bind `token` to `user_id`, replacing any previous binding of the token.
    async fn set(&self, token: &str, user_id: i64) -> Result<(), SessionError>;

    /// Invalidate `token`.
    async fn revoke(&self, token: &str) -> Result<(), SessionError>;
}
