//! Auth E2E test suite.
//!
//! Drives the `/Auth` routes against real GitHub and GitLab provider clients
//! pointed at an in-process mock OAuth server. Stores are in memory, so no
//! database is needed.
//!
//! Run with: cargo test --test auth_e2e

mod mock_provider;
mod test_helpers;

mod test_authenticate;
mod test_login;
mod test_logout;
mod test_providers;
