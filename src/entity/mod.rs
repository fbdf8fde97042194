//! SeaORM entity definitions for PostgreSQL database.

pub mod user;
pub mod user_access_token;
pub mod user_repository;
pub mod user_session;
pub mod user_statistics;
