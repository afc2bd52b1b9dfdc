use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{error, info, warn};

use astro_rest_api::{
    auth::TokenIssuer,
    config::{Config, StorageBackend},
    create_router,
    db::{PostRepository, UserRepository},
    ephemeris::OrbitalElementsEphemeris,
    middleware::init_tracing,
    AppState, ChartCalculator, Database, MemoryStore, RouterSettings,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let (users, posts): (Arc<dyn UserRepository>, Arc<dyn PostRepository>) = match config.storage {
        StorageBackend::Postgres(ref database_config) => {
            let database = match Database::new(database_config.clone()).await {
                Ok(db) => {
                    info!("Database connection established");
                    Arc::new(db)
                }
                Err(e) => {
                    error!("Failed to connect to database: {}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = database.migrate().await {
                error!("Failed to run database migrations: {}", e);
                std::process::exit(1);
            }

            let users: Arc<dyn UserRepository> = database.clone();
            let posts: Arc<dyn PostRepository> = database;
            (users, posts)
        }
        StorageBackend::Memory => {
            if config.environment.is_production() {
                warn!("In-memory storage selected in production; data will not survive a restart");
            } else {
                info!("Using in-memory storage");
            }
            let store = Arc::new(MemoryStore::new());
            let users: Arc<dyn UserRepository> = store.clone();
            let posts: Arc<dyn PostRepository> = store;
            (users, posts)
        }
    };

    let tokens = TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_ttl);
    info!("Issuing tokens valid for {:?}", tokens.ttl());

    let chart = ChartCalculator::new(
        Arc::new(OrbitalElementsEphemeris::new()),
        config.astro.body_timeout,
    );

    let state = AppState::new(users, posts, tokens, chart);
    let settings = RouterSettings {
        cors_origin: config.cors_origin.clone(),
        posts_require_auth: config.posts_require_auth,
    };
    if settings.posts_require_auth {
        info!("Post mutations require a bearer token");
    }

    let app = match create_router(state, &settings) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to build router: {}", e);
            std::process::exit(1);
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("Server listening on {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Start the server with graceful shutdown handling
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
/// Listens for SIGTERM and SIGINT signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        },
    }
}
