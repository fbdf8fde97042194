//! API endpoint modules.

pub mod auth;
pub mod health;
pub mod openapi;

use actix_web::{ResponseError, web};

pub use auth::configure_routes as configure_auth_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;

use crate::error::AppError;

/// JSON extractor config that reports malformed bodies as `{error, message}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let app_err = AppError::InvalidInput(err.to_string());
        let resp = app_err.error_response();
        actix_web::error::InternalError::from_response(err, resp).into()
    })
}
