//! GitHub OAuth app client.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::warn;

use super::{
    OAuthProvider, ProviderError, base_url, build_http_client, ensure_success, non_empty,
    parse_optional_url, parse_timestamp, parse_url,
};
use crate::config::GitHubConfig;
use crate::models::{Provider, ProviderToken, Repository, User};

pub struct GitHubProvider {
    client_id: String,
    client_secret: SecretString,
    oauth_url: String,
    api_url: String,
    http: reqwest::Client,
}

impl GitHubProvider {
    pub fn new(config: &GitHubConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            oauth_url: base_url("GitHub OAuth", &config.oauth_url)?,
            api_url: base_url("GitHub API", &config.api_url)?,
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
    login: String,
    #[serde(default)]
    node_id: String,
    name: Option<String>,
    avatar_url: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    location: Option<String>,
    email: Option<String>,
    #[serde(default)]
    public_repos: i64,
    #[serde(default)]
    followers: i64,
    #[serde(default)]
    following: i64,
    created_at: String,
}

impl ProfileResponse {
    fn into_user(self) -> Result<User, ProviderError> {
        Ok(User {
            id: 0,
            provider: Provider::GitHub,
            provider_id: self.id,
            node_id: self.node_id,
            name: non_empty(self.name).unwrap_or_else(|| self.login.clone()),
            avatar_url: parse_optional_url("avatar", self.avatar_url)?,
            profile_url: parse_optional_url("profile", self.html_url)?.unwrap_or_default(),
            username: self.login,
            location: non_empty(self.location),
            email: non_empty(self.email),
            public_repositories: self.public_repos,
            followers: self.followers,
            following: self.following,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            registered_at: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    id: i64,
    name: String,
    owner: RepositoryOwner,
    html_url: String,
    description: Option<String>,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    forks_count: i64,
    #[serde(default)]
    stargazers_count: i64,
    created_at: String,
    updated_at: String,
}

impl RepositoryResponse {
    fn into_repository(self) -> Result<Repository, ProviderError> {
        Ok(Repository {
            id: self.id,
            provider: Provider::GitHub,
            url: parse_url("repository", &self.html_url)?,
            name: self.name,
            description: non_empty(self.description),
            fork: self.fork,
            forks_count: self.forks_count,
            stars_count: self.stargazers_count,
            owner_username: self.owner.login,
            created_at: parse_timestamp("repository created_at", &self.created_at)?,
            last_activity_at: parse_timestamp("repository updated_at", &self.updated_at)?,
        })
    }
}

#[async_trait]
impl OAuthProvider for GitHubProvider {
    async fn acquire_access_token(&self, code: &str) -> Result<ProviderToken, ProviderError> {
        if code.trim().is_empty() {
            return Err(ProviderError::CodeEmpty);
        }

        let resp = self
            .http
            .post(format!("{}/login/oauth/access_token", self.oauth_url))
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "client_id": self.client_id,
                "client_secret": self.client_secret.expose_secret(),
                "code": code,
            }))
            .send()
            .await
            .map_err(|e| {
                warn!("GitHub: failed to exchange code: {}", e);
                ProviderError::Http(e)
            })?;

        let token_response: TokenResponse = ensure_success(Provider::GitHub, resp)?
            .json()
            .await
            .map_err(ProviderError::Decode)?;

        // GitHub reports grant failures as 200 with an `error` field
        if let Some(err) = token_response.error {
            warn!("GitHub: token exchange rejected: {}", err);
            return Err(ProviderError::Rejected(
                token_response.error_description.unwrap_or(err),
            ));
        }

        let access_token = non_empty(token_response.access_token).ok_or_else(|| {
            warn!("GitHub: no access_token in response");
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
            .get(format!("{}/user", self.api_url))
            .header("Accept", "application/vnd.github+json")
            .header(
                "Authorization",
                format!("Bearer {}", access_token.expose_secret()),
            )
            .send()
            .await?;

        let profile: ProfileResponse = ensure_success(Provider::GitHub, resp)?
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
                "{}/users/{}/repos",
                self.api_url,
                urlencoding::encode(username)
            ))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let repos: Vec<RepositoryResponse> = ensure_success(Provider::GitHub, resp)?
            .json()
            .await
            .map_err(ProviderError::Decode)?;

        repos
            .into_iter()
            .map(RepositoryResponse::into_repository)
            .collect()
    }
}
