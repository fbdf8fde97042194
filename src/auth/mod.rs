//! Request authentication: application session token to user.
//!
//! Every module that needs a caller identity goes through [`Authenticate`].
//! Handlers can take the [`AuthenticatedUser`] extractor (bearer header) or
//! resolve an [`Authentication`] envelope embedded in a request body.

mod extractor;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

pub use extractor::AuthenticatedUser;

use crate::models::{Authentication, User};
use crate::services::session_store::{SessionError, SessionStore};
use crate::services::user_store::{StoreError, UserStore};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("access token is empty")]
    ParameterEmpty,

    #[error("session is invalid or expired")]
    InvalidSession,

    #[error("user not found")]
    UserNotFound,

    #[error("session lookup failed: {0}")]
    Session(#[source] SessionError),

    #[error("user lookup failed: {0}")]
    Store(#[source] StoreError),

    #[error("authentication is not configured")]
    NotConfigured,
}

/// Resolve an application access token to the user it was issued for.
#[async_trait]
pub trait Authenticate: Send + Sync {
    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError>;
}

/// Session lookup followed by a cached user lookup.
#[derive(Clone)]
pub struct AuthMiddleware {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserStore>,
}

impl AuthMiddleware {
    pub fn new(sessions: Arc<dyn SessionStore>, users: Arc<dyn UserStore>) -> Self {
        Self { sessions, users }
    }

    /// Authenticate the envelope other modules embed in their request bodies.
    pub async fn authenticate_body(&self, body: &Authentication) -> Result<User, AuthError> {
        self.authenticate(&body.access_token).await
    }
}

#[async_trait]
impl Authenticate for AuthMiddleware {
    async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        if access_token.trim().is_empty() {
            return Err(AuthError::ParameterEmpty);
        }

        let user_id = self.sessions.get(access_token).await.map_err(|e| match e {
            SessionError::EmptyValue => AuthError::ParameterEmpty,
            SessionError::NotExists => AuthError::InvalidSession,
            other => AuthError::Session(other),
        })?;

        let user = self.users.get_user_by_id(user_id).await.map_err(|e| match e {
            StoreError::UserNotFound => AuthError::UserNotFound,
            other => AuthError::Store(other),
        })?;

        debug!(user_id, "Authenticated request");
        Ok(user)
    }
}
