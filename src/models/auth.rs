//! Request/response bodies for the `/Auth` endpoints and the
//! authentication envelope embedded by other modules.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// POST /Auth/Login body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// 0 = GitHub, 1 = GitLab
    pub provider: u8,
    /// Authorization code returned by the provider's consent redirect.
    #[serde(default)]
    pub access_code: String,
}

/// POST /Auth/Login response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
}

/// POST /Auth/Logout body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutRequest {
    #[serde(default)]
    pub access_token: String,
}

/// Empty JSON object response.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct EmptyResponse {}

/// Authentication field embedded in request bodies of other modules.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct Authentication {
    #[serde(default)]
    pub access_token: String,
}

/// Request body carrying only the authentication envelope.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthenticatedRequest {
    #[serde(default)]
    pub authentication: Authentication,
}

/// OAuth token pair issued by a provider.
///
/// GitHub only returns a refresh token when expiring user tokens are enabled
/// for the OAuth app.
#[derive(Debug)]
pub struct ProviderToken {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
}

impl ProviderToken {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: refresh_token.map(SecretString::from),
        }
    }
}
