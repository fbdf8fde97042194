//! GitLab OAuth application client. Works against gitlab.com or a
//! self-hosted instance.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::warn;

use super::{
    OAuthProvider, ProviderError, base_url, build_http_client, ensure_success, non_empty,
    parse_optional_url, parse_timestamp, parse_url,
};
use crate::config::GitLabConfig;
use crate::models::{PUBLIC_REPOSITORIES_UNKNOWN, Provider, ProviderToken, Repository, User};

pub struct GitLabProvider {
    client_id: String,
    client_secret: SecretString,
    redirect_url: String,
    base_url: String,
    http: reqwest::Client,
}

impl GitLabProvider {
    pub fn new(config: &GitLabConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
            base_url: base_url("GitLab", &config.base_url)?,
            http: build_http_client()?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    id: i64,
    username: String,
    #[serde(default)]
    name: String,
    avatar_url: Option<String>,
    #[serde(default)]
    web_url: Option<String>,
    created_at: String,
    location: Option<String>,
    email: Option<String>,
    #[serde(default)]
    followers: i64,
    #[serde(default)]
    following: i64,
}

impl ProfileResponse {
    fn into_user(self) -> Result<User, ProviderError> {
        Ok(User {
            id: 0,
            provider: Provider::GitLab,
            provider_id: self.id,
            node_id: String::new(),
            name: self.name,
            username: self.username,
            avatar_url: parse_optional_url("avatar", self.avatar_url)?,
            profile_url: parse_optional_url("profile", self.web_url)?.unwrap_or_default(),
            location: non_empty(self.location),
            email: non_empty(self.email),
            public_repositories: PUBLIC_REPOSITORIES_UNKNOWN,
            followers: self.followers,
            following: self.following,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            registered_at: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Namespace {
    path: String,
}

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    id: i64,
    name: String,
    description: Option<String>,
    web_url: String,
    #[serde(default)]
    forks_count: i64,
    #[serde(default)]
    star_count: i64,
    created_at: String,
    last_activity_at: String,
    namespace: Namespace,
    /// Present only on forks.
    #[serde(default)]
    forked_from_project: Option<serde_json::Value>,
}

impl ProjectResponse {
    fn into_repository(self) -> Result<Repository, ProviderError> {
        Ok(Repository {
            id: self.id,
            provider: Provider::GitLab,
            url: parse_url("repository", &self.web_url)?,
            name: self.name,
            description: non_empty(self.description),
            fork: self.forked_from_project.is_some(),
            forks_count: self.forks_count,
            stars_count: self.star_count,
            owner_username: self.namespace.path,
            created_at: parse_timestamp("repository created_at", &self.created_at)?,
            last_activity_at: parse_timestamp(
                "repository last_activity_at",
                &self.last_activity_at,
            )?,
        })
    }
}

#[async_trait]
impl OAuthProvider for GitLabProvider {
    async fn acquire_access_token(&self, code: &str) -> Result<ProviderToken, ProviderError> {
        if code.trim().is_empty() {
            return Err(ProviderError::CodeEmpty);
        }

        let resp = self
            .http
            .post(format!("{}/oauth/token", self.base_url))
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "client_id": self.client_id,
                "client_secret": self.client_secret.expose_secret(),
                "code": code,
                "grant_type": "authorization_code",
                "redirect_uri": self.redirect_url,
            }))
            .send()
            .await
            .map_err(|e| {
                warn!("GitLab: failed to exchange code: {}", e);
                ProviderError::Http(e)
            })?;

        let token_response: TokenResponse = ensure_success(Provider::GitLab, resp)?
            .json()
            .await
            .map_err(ProviderError::Decode)?;

        if let Some(err) = token_response.error {
            warn!("GitLab: token exchange rejected: {}", err);
            return Err(ProviderError::Rejected(
                token_response.error_description.unwrap_or(err),
            ));
        }

        let access_token = non_empty(token_response.access_token).ok_or_else(|| {
            warn!("GitLab: no access_token in response");
            ProviderError::MissingToken
        })?;

        Ok(ProviderToken::new(
            access_token,
            non_empty(token_response.refresh_token),
        ))
    }

    async fn get_profile(&self, access_token: &SecretString) -> Result<User, ProviderError> {
        if access_token.expose_secret().trim().is_empty() {
            return Err(ProviderError::CodeEmpty);
        }

        let resp = self
            .http
            .get(format!("{}/api/v4/user", self.base_url))
            .header("Accept", "application/json")
            .header(
                "Authorization",
                format!("Bearer {}", access_token.expose_secret()),
            )
            .send()
            .await?;

        let profile: ProfileResponse = ensure_success(Provider::GitLab, resp)?
            .json()
            .await
            .map_err(ProviderError::Decode)?;

        profile.into_user()
    }

    async fn get_public_repositories(
        &self,
        username: &str,
    ) -> Result<Vec<Repository>, ProviderError> {
        if username.trim().is_empty() {
            return Err(ProviderError::CodeEmpty);
        }

        let resp = self
            .http
            .get(format!(
                "{}/api/v4/users/{}/projects",
                self.base_url,
                urlencoding::encode(username)
            ))
            .header("Accept", "application/json")
            .send()
            .await?;

        let projects: Vec<ProjectResponse> = ensure_success(Provider::GitLab, resp)?
            .json()
            .await
            .map_err(ProviderError::Decode)?;

        projects
            .into_iter()
            .map(ProjectResponse::into_repository)
            .collect()
    }
}
