//! Cleanup service for expired cache entries and durable sessions.

use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, error, info};

use crate::services::memory_cache::MemoryCache;
use crate::services::session_store::PostgresSessionStore;

/// What the cleanup task sweeps.
#[derive(Clone)]
pub struct CleanupConfig {
    /// In-process caches, by name for logging
    pub caches: Vec<(&'static str, MemoryCache)>,
    /// Durable session table, when that backend is in use
    pub sessions: Option<PostgresSessionStore>,
    /// How often to run cleanup
    pub interval: Duration,
}

/// Start the cleanup background task.
///
/// This spawns a tokio task that periodically drops expired cache entries
/// and deletes expired durable sessions.
pub fn start_cleanup_task(config: CleanupConfig) {
    tokio::spawn(async move {
        info!(
            "Starting cleanup service ({} caches, durable sessions: {}, interval: {} seconds)",
            config.caches.len(),
            config.sessions.is_some(),
            config.interval.as_secs()
        );

        let mut ticker = interval(config.interval);

        loop {
            ticker.tick().await;
            run_cleanup(&config).await;
        }
    });
}

/// Run a single cleanup cycle.
async fn run_cleanup(config: &CleanupConfig) {
    for (name, cache) in &config.caches {
        let purged = cache.purge_expired().await;
        if purged > 0 {
            debug!(cache = %name, purged, "Purged expired cache entries");
        }
    }

    if let Some(ref sessions) = config.sessions {
        match sessions.purge_expired().await {
            Ok(0) => {}
            Ok(deleted) => info!("Deleted {} expired sessions", deleted),
            Err(e) => error!("Session cleanup error: {}", e),
        }
    }
}
