//! Actix-web extractor for bearer session tokens.
//!
//! The token from the `Authorization` header is wrapped in `SecretString`
//! immediately and never logged.

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use futures_util::future::LocalBoxFuture;
use secrecy::{ExposeSecret, SecretString};

use super::{AuthError, AuthMiddleware, Authenticate};
use crate::error::AppError;
use crate::models::User;

const BEARER_PREFIX: &str = "bearer ";

/// Token from `Authorization: Bearer <token>`. Missing or malformed headers
/// yield `None`.
fn extract_bearer(req: &HttpRequest) -> Option<SecretString> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    if value.len() < BEARER_PREFIX.len()
        || !value[..BEARER_PREFIX.len()].eq_ignore_ascii_case(BEARER_PREFIX)
    {
        return None;
    }
    Some(SecretString::from(value[BEARER_PREFIX.len()..].trim().to_string()))
}

impl From<&AuthError> for AppError {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::Session(_) | AuthError::Store(_) | AuthError::NotConfigured => {
                AppError::Internal(format!("authentication backend: {}", err))
            }
            _ => AppError::Unauthorized(err.to_string()),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        AppError::from(self).status_code()
    }

    fn error_response(&self) -> HttpResponse {
        AppError::from(self).error_response()
    }
}

/// Extractor that requires a valid session token.
///
/// ```ignore
/// async fn handler(auth: AuthenticatedUser) -> impl Responder {
///     // auth.user is the caller
/// }
/// ```
pub struct AuthenticatedUser {
    pub user: User,
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let middleware = req.app_data::<web::Data<AuthMiddleware>>().cloned();
        let token = extract_bearer(req);

        Box::pin(async move {
            let middleware = middleware.ok_or(AuthError::NotConfigured)?;
            let token = token.ok_or(AuthError::ParameterEmpty)?;

            let user = middleware.authenticate(token.expose_secret()).await?;
            Ok(AuthenticatedUser { user })
        })
    }
}
