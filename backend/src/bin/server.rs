//! Articles HTTP Server Binary
//!
//! Loads the configuration file, opens the repository, checks the database
//! answers, and serves the REST API until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Run with the in-memory repository (default features)
//! cargo run --bin articles-server
//!
//! # Run against MySQL
//! ARTICLES_CONFIG=config.json \
//!   cargo run --bin articles-server --features "mysql-repo,http-server"
//! ```
//!
//! # Environment Variables
//!
//! - `ARTICLES_CONFIG`: Path of the JSON config file (default: config.json)
//! - `RUST_LOG`: Log level (default: info, or debug when `debug` is set)

use std::env;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use articles_service::config::AppConfig;
use articles_service::db::RepositoryFactory;
use articles_service::http::{create_router, AppState};
use articles_service::services::{ArticleService, ArticleUsecase};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = AppConfig::default_path();
    let config = AppConfig::from_file(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let default_level = if config.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default_level),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!(config = %config_path.display(), "Starting articles HTTP server");
    if config.debug {
        info!("Service RUN on DEBUG mode");
    }

    info!(dsn = %config.database.redacted_dsn(), "Opening database");
    let repositories = RepositoryFactory::create(&config.database)
        .await
        .context("opening repository")?;

    let service = ArticleService::from_repositories(repositories, config.context_timeout());
    if !service.health_check().await.context("pinging database")? {
        anyhow::bail!("database did not answer the startup ping");
    }
    info!("Repository initialized successfully");

    let app = create_router(AppState::new(Arc::new(service)));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, database pool released");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
