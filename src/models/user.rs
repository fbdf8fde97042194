//! User and repository models shared by providers, stores and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// OAuth identity provider.
///
/// Persisted as a small integer and received on the wire as `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    GitHub,
    GitLab,
}

impl Provider {
    /// Numeric representation used in requests and in the database.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::GitHub => 0,
            Self::GitLab => 1,
        }
    }

    /// Column value for the `provider` SMALLINT columns.
    pub fn as_i16(&self) -> i16 {
        self.as_u8() as i16
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
        }
    }
}

impl TryFrom<u8> for Provider {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::GitHub),
            1 => Ok(Self::GitLab),
            other => Err(other),
        }
    }
}

impl TryFrom<i16> for Provider {
    type Error = i16;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(|v| Provider::try_from(v).ok())
            .ok_or(value)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentinel for providers that do not report a public repository count.
pub const PUBLIC_REPOSITORIES_UNKNOWN: i64 = -1;

/// Local user record, joined with its latest statistics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Local identifier, `0` until the user has been persisted.
    pub id: i64,
    pub provider: Provider,
    /// User identifier native to the provider.
    pub provider_id: i64,
    /// GitHub GraphQL node id; empty for GitLab.
    pub node_id: String,
    /// Display name shown on the provider profile page.
    pub name: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub profile_url: String,
    pub location: Option<String>,
    pub email: Option<String>,
    pub public_repositories: i64,
    pub followers: i64,
    pub following: i64,
    /// When the account was created at the provider.
    pub created_at: DateTime<Utc>,
    /// When the user first logged in here. `None` for profiles not yet stored.
    pub registered_at: Option<DateTime<Utc>>,
}

/// Public repository owned by a user at the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository identifier native to the provider.
    pub id: i64,
    pub provider: Provider,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub fork: bool,
    pub forks_count: i64,
    pub stars_count: i64,
    pub owner_username: String,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

/// User info response (returned by /Auth/Me).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    /// 0 = GitHub, 1 = GitLab
    pub provider: u8,
    pub name: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub profile_url: String,
    pub location: Option<String>,
    pub email: Option<String>,
    pub public_repositories: i64,
    pub followers: i64,
    pub following: i64,
    pub created_at: DateTime<Utc>,
    pub registered_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            provider: u.provider.as_u8(),
            name: u.name,
            username: u.username,
            avatar_url: u.avatar_url,
            profile_url: u.profile_url,
            location: u.location,
            email: u.email,
            public_repositories: u.public_repositories,
            followers: u.followers,
            following: u.following,
            created_at: u.created_at,
            registered_at: u.registered_at,
        }
    }
}
