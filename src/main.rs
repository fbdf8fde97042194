//! Kodiiing auth server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use secrecy::ExposeSecret;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use kodiiing_lib::api;
use kodiiing_lib::auth::AuthMiddleware;
use kodiiing_lib::config::{Config, SessionBackend};
use kodiiing_lib::db::DbPool;
use kodiiing_lib::middleware::RequestLogger;
use kodiiing_lib::services::session_store::{
    MemorySessionStore, PostgresSessionStore, SessionStore,
};
use kodiiing_lib::services::user_store::{CachedUserStore, PostgresUserStore, UserStore};
use kodiiing_lib::services::{
    AuthenticationService, CleanupConfig, MemoryCache, ProviderRegistry, SymmetricCipher,
    start_cleanup_task,
};

/// Log a fatal startup error and exit.
fn fail(what: &str, err: impl std::fmt::Display) -> ! {
    error!("{}: {}", what, err);
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and KDG_CIPHER_KEY must be set");
            error!("  - In production, at least one OAuth provider must be configured");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Kodiiing Auth Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for DATABASE_URL and KDG_CIPHER_KEY");
    }

    let pool = DbPool::new(&config)
        .await
        .unwrap_or_else(|e| fail("Failed to connect to database", e));
    info!("Database connection established");

    pool.run_migrations()
        .await
        .unwrap_or_else(|e| fail("Failed to run migrations", e));

    let cipher = SymmetricCipher::from_hex(config.cipher_key.expose_secret())
        .unwrap_or_else(|e| fail("Invalid KDG_CIPHER_KEY", e));

    let registry = ProviderRegistry::from_config(&config)
        .unwrap_or_else(|e| fail("Failed to configure OAuth providers", e));
    if registry.is_empty() {
        warn!("No OAuth provider configured; every login will be rejected");
    } else {
        info!("OAuth providers: {:?}", registry.providers());
    }

    // Users: durable store behind the read-through cache
    let user_cache = MemoryCache::new(config.cache_ttl);
    let users: Arc<dyn UserStore> = Arc::new(CachedUserStore::new(
        Arc::new(PostgresUserStore::new(pool.clone(), cipher)),
        user_cache.clone(),
    ));

    let mut caches = vec![("users", user_cache)];
    let mut durable_sessions = None;
    let sessions: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Memory => {
            let store = MemorySessionStore::new(MemoryCache::new(config.session_ttl));
            caches.push(("sessions", store.cache().clone()));
            Arc::new(store)
        }
        SessionBackend::Postgres => {
            let store = PostgresSessionStore::new(pool.clone(), config.session_ttl);
            durable_sessions = Some(store.clone());
            Arc::new(store)
        }
    };
    info!(
        "Session backend: {:?} (ttl {}s)",
        config.session_backend,
        config.session_ttl.as_secs()
    );

    start_cleanup_task(CleanupConfig {
        caches,
        sessions: durable_sessions,
        interval: config.cache_purge_interval,
    });

    let auth_service = web::Data::new(AuthenticationService::new(
        registry,
        Arc::clone(&users),
        Arc::clone(&sessions),
    ));
    let auth_middleware = web::Data::new(AuthMiddleware::new(sessions, users));

    let bind_address = config.bind_address();
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    let server = HttpServer::new(move || {
        let cors = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        } else {
            // same-origin only
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        App::new()
            // CORS must wrap before other middleware
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(auth_service.clone())
            .app_data(auth_middleware.clone())
            .app_data(api::json_config())
            .configure(api::configure_auth_routes)
            .service(web::scope("/api/v1").configure(api::configure_health_routes))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
            )
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
