//! OAuth identity providers.
//!
//! Each provider exchanges an authorization code for a token pair, fetches the
//! authenticated profile and lists a user's public repositories. Clients are
//! registered by [`Provider`] in a [`ProviderRegistry`]; the authentication
//! service never names a concrete provider.

mod github;
mod gitlab;

pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;

use crate::config::Config;
use crate::models::{Provider, ProviderToken, Repository, User};

/// HTTP connect timeout for provider API calls.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// HTTP total timeout for provider API calls.
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Sent on every outbound request; GitHub rejects requests without one.
const USER_AGENT: &str = "kodiiing";

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Blank code, token or username passed in.
    #[error("parameter is empty")]
    CodeEmpty,

    #[error("request to provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode provider response: {0}")]
    Decode(#[source] reqwest::Error),

    /// The provider answered but refused the grant.
    #[error("provider rejected the request: {0}")]
    Rejected(String),

    #[error("provider response did not contain an access token")]
    MissingToken,

    #[error("invalid {field} url: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("invalid {field} timestamp: {source}")]
    Timestamp {
        field: &'static str,
        #[source]
        source: chrono::ParseError,
    },
}

/// Contract every OAuth provider client implements.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Exchange an authorization code for a token pair.
    async fn acquire_access_token(&self, code: &str) -> Result<ProviderToken, ProviderError>;

    /// Fetch the profile owning `access_token`. `id` and `registered_at` are unset.
    async fn get_profile(&self, access_token: &SecretString) -> Result<User, ProviderError>;

    /// First page of public repositories owned by `username`.
    async fn get_public_repositories(
        &self,
        username: &str,
    ) -> Result<Vec<Repository>, ProviderError>;
}

/// Fixed lookup of configured providers.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<dyn OAuthProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build clients for every provider that has credentials configured.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let mut registry = Self::new();

        if let Some(ref github) = config.github {
            registry.register(Provider::GitHub, Arc::new(GitHubProvider::new(github)?));
        }
        if let Some(ref gitlab) = config.gitlab {
            registry.register(Provider::GitLab, Arc::new(GitLabProvider::new(gitlab)?));
        }

        Ok(registry)
    }

    pub fn register(&mut self, provider: Provider, client: Arc<dyn OAuthProvider>) {
        self.providers.insert(provider, client);
    }

    pub fn with(mut self, provider: Provider, client: Arc<dyn OAuthProvider>) -> Self {
        self.register(provider, client);
        self
    }

    pub fn get(&self, provider: Provider) -> Option<Arc<dyn OAuthProvider>> {
        self.providers.get(&provider).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered providers, for startup logging.
    pub fn providers(&self) -> Vec<Provider> {
        let mut list: Vec<Provider> = self.providers.keys().copied().collect();
        list.sort_by_key(|p| p.as_u8());
        list
    }
}

/// Build an HTTP client with timeouts.
fn build_http_client() -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Validate a configured base URL and strip any trailing slash.
fn base_url(field: &'static str, value: &str) -> Result<String, ProviderError> {
    parse_url(field, value)?;
    Ok(value.trim_end_matches('/').to_string())
}

fn parse_url(field: &'static str, value: &str) -> Result<String, ProviderError> {
    reqwest::Url::parse(value)
        .map(|url| url.to_string())
        .map_err(|e| ProviderError::InvalidUrl {
            field,
            reason: e.to_string(),
        })
}

/// Optional URL field: blank is `None`, anything else must parse.
fn parse_optional_url(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ProviderError> {
    match non_empty(value) {
        Some(v) => parse_url(field, &v).map(Some),
        None => Ok(None),
    }
}

/// RFC 3339 timestamp, with or without fractional seconds.
fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ProviderError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| ProviderError::Timestamp { field, source })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fail on non-2xx responses, logging the provider and status.
fn ensure_success(
    provider: Provider,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if !status.is_success() {
        tracing::warn!(%provider, %status, url = %resp.url().path(), "Provider returned error status");
        return Err(ProviderError::Status(status));
    }
    Ok(resp)
}
