//! Kodiiing authentication server library.
//!
//! OAuth login through GitHub and GitLab, encrypted provider tokens, user
//! records behind a read-through cache, application sessions and the
//! request authentication used by every other module.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
