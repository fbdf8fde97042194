//! Business logic services.

pub mod auth;
pub mod cipher;
pub mod cleanup;
pub mod memory_cache;
pub mod providers;
pub mod session_store;
pub mod user_store;

pub use auth::{AuthServiceError, AuthenticationService};
pub use cipher::SymmetricCipher;
pub use cleanup::{CleanupConfig, start_cleanup_task};
pub use memory_cache::MemoryCache;
pub use providers::ProviderRegistry;
