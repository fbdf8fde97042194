//! Login and logout orchestration.
//!
//! Login walks a fixed sequence: exchange the authorization code with the
//! provider, fetch the profile, find or register the local user, append a
//! repository snapshot, store the encrypted provider tokens and finally issue
//! an application session token.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use actix_web::http::StatusCode;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{
    EmptyResponse, LoginRequest, LoginResponse, LogoutRequest, Provider, ProviderToken, User,
};
use crate::services::providers::{OAuthProvider, ProviderError, ProviderRegistry};
use crate::services::session_store::{SessionError, SessionStore};
use crate::services::user_store::{StoreError, UserStore};

/// Prefix of application session tokens.
pub const SESSION_TOKEN_PREFIX: &str = "kdg_";

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid provider: {0}")]
    InvalidProvider(u8),

    #[error("access code is empty")]
    CodeEmpty,

    #[error("provider rejected the access code: {0}")]
    Rejected(String),

    #[error("failed to acquire provider access token: {0}")]
    AcquireToken(#[source] ProviderError),

    #[error("failed to fetch provider profile: {0}")]
    Profile(#[source] ProviderError),

    #[error("failed to fetch public repositories: {0}")]
    Repositories(#[source] ProviderError),

    #[error("user store failed during {step}: {source}")]
    Store {
        step: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("failed to issue session: {0}")]
    Session(#[from] SessionError),
}

impl AuthServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthServiceError::InvalidProvider(_)
            | AuthServiceError::CodeEmpty
            | AuthServiceError::Rejected(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn store(step: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| AuthServiceError::Store { step, source }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        if err.status_code() == StatusCode::BAD_REQUEST {
            AppError::InvalidInput(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

/// Generate an unguessable, URL-safe application session token.
pub fn generate_session_token() -> String {
    let random_bytes: [u8; 32] = rand::random();
    format!("{}{}", SESSION_TOKEN_PREFIX, hex::encode(random_bytes))
}

pub struct AuthenticationService {
    providers: ProviderRegistry,
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    swallowed_logout_errors: AtomicU64,
}

impl AuthenticationService {
    pub fn new(
        providers: ProviderRegistry,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            providers,
            users,
            sessions,
            swallowed_logout_errors: AtomicU64::new(0),
        }
    }

    pub fn sessions(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.sessions)
    }

    pub fn users(&self) -> Arc<dyn UserStore> {
        Arc::clone(&self.users)
    }

    /// Number of logout failures hidden from callers since startup.
    pub fn swallowed_logout_errors(&self) -> u64 {
        self.swallowed_logout_errors.load(Ordering::Relaxed)
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, AuthServiceError> {
        let provider = Provider::try_from(req.provider)
            .map_err(AuthServiceError::InvalidProvider)?;
        let client = self
            .providers
            .get(provider)
            .ok_or(AuthServiceError::InvalidProvider(req.provider))?;

        let token = client
            .acquire_access_token(&req.access_code)
            .await
            .map_err(|e| match e {
                ProviderError::CodeEmpty => AuthServiceError::CodeEmpty,
                ProviderError::Rejected(reason) => AuthServiceError::Rejected(reason),
                other => AuthServiceError::AcquireToken(other),
            })?;

        let profile = client
            .get_profile(&token.access_token)
            .await
            .map_err(AuthServiceError::Profile)?;

        let user_id = self.resolve_user(&profile).await?;
        self.snapshot_repositories(client.as_ref(), user_id, &profile.username)
            .await?;
        self.store_provider_token(user_id, &token).await?;

        let access_token = generate_session_token();
        self.sessions.set(&access_token, user_id).await?;

        info!(provider = %provider, user_id, "Login succeeded");
        Ok(LoginResponse { access_token })
    }

    /// Revoke the session. Always succeeds for the caller.
    pub async fn logout(&self, req: &LogoutRequest) -> EmptyResponse {
        if let Err(e) = self.sessions.revoke(&req.access_token).await {
            let total = self.swallowed_logout_errors.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(error = %e, swallowed_total = total, "Logout revoke failed");
        }
        EmptyResponse {}
    }

    /// Local id for the profile, registering the user on first login.
    async fn resolve_user(&self, profile: &User) -> Result<i64, AuthServiceError> {
        match self
            .users
            .get_user_by_provider_id(profile.provider, profile.provider_id)
            .await
        {
            Ok(existing) => {
                self.users
                    .refresh_user_statistics(existing.id, profile)
                    .await
                    .map_err(AuthServiceError::store("refresh_user_statistics"))?;
                debug!(user_id = existing.id, "Returning user");
                Ok(existing.id)
            }
            Err(StoreError::UserNotFound) => {
                let user_id = self
                    .users
                    .create_user(profile)
                    .await
                    .map_err(AuthServiceError::store("create_user"))?;
                self.users
                    .create_user_statistics(user_id, profile)
                    .await
                    .map_err(AuthServiceError::store("create_user_statistics"))?;
                info!(user_id, provider = %profile.provider, "Registered new user");
                Ok(user_id)
            }
            Err(e) => Err(AuthServiceError::store("get_user_by_provider_id")(e)),
        }
    }

    async fn snapshot_repositories(
        &self,
        client: &dyn OAuthProvider,
        user_id: i64,
        username: &str,
    ) -> Result<(), AuthServiceError> {
        let repositories = client
            .get_public_repositories(username)
            .await
            .map_err(AuthServiceError::Repositories)?;
        debug!(user_id, count = repositories.len(), "Fetched public repositories");

        self.users
            .create_user_repository(user_id, &repositories)
            .await
            .map_err(AuthServiceError::store("create_user_repository"))
    }

    async fn store_provider_token(
        &self,
        user_id: i64,
        token: &ProviderToken,
    ) -> Result<(), AuthServiceError> {
        let refresh: Option<&SecretString> = token.refresh_token.as_ref();
        self.users
            .create_user_access_token(user_id, &token.access_token, refresh)
            .await
            .map_err(AuthServiceError::store("create_user_access_token"))
    }
}
