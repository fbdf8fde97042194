//! Domain models for the Kodiiing authentication server.

pub mod auth;
pub mod user;

// Re-export commonly used types
pub use auth::{
    AuthenticatedRequest, Authentication, EmptyResponse, LoginRequest, LoginResponse,
    LogoutRequest, ProviderToken,
};
pub use user::{PUBLIC_REPOSITORIES_UNKNOWN, Provider, Repository, User, UserResponse};
