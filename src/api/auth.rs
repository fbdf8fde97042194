//! `/Auth` endpoints: login, logout and the current user.

use actix_web::{HttpResponse, get, post, web};

use crate::auth::{AuthError, AuthMiddleware, AuthenticatedUser};
use crate::error::{AppResult, ErrorResponse};
use crate::models::{
    AuthenticatedRequest, EmptyResponse, LoginRequest, LoginResponse, LogoutRequest,
    UserResponse,
};
use crate::services::AuthenticationService;

/// Exchange a provider authorization code for an application access token.
#[utoipa::path(
    post,
    path = "/Auth/Login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 400, description = "Unknown provider or empty/rejected code", body = ErrorResponse),
        (status = 500, description = "Provider or store failure", body = ErrorResponse)
    )
)]
#[post("/Auth/Login")]
pub async fn login(
    service: web::Data<AuthenticationService>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let resp = service.login(&body).await?;
    Ok(HttpResponse::Ok().json(resp))
}

/// Revoke an access token. Always succeeds once the body parses.
#[utoipa::path(
    post,
    path = "/Auth/Logout",
    tag = "Auth",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out", body = EmptyResponse)
    )
)]
#[post("/Auth/Logout")]
pub async fn logout(
    service: web::Data<AuthenticationService>,
    body: web::Json<LogoutRequest>,
) -> HttpResponse {
    HttpResponse::Ok().json(service.logout(&body).await)
}

/// Resolve the authentication envelope in the body to its user.
#[utoipa::path(
    post,
    path = "/Auth/Me",
    tag = "Auth",
    request_body = AuthenticatedRequest,
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[post("/Auth/Me")]
pub async fn me_from_body(
    middleware: web::Data<AuthMiddleware>,
    body: web::Json<AuthenticatedRequest>,
) -> Result<HttpResponse, AuthError> {
    let user = middleware.authenticate_body(&body.authentication).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Current user from the bearer token.
#[utoipa::path(
    get,
    path = "/Auth/Me",
    tag = "Auth",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[get("/Auth/Me")]
pub async fn me(auth: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(auth.user))
}

/// Configure authentication routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(logout)
        .service(me_from_body)
        .service(me);
}
