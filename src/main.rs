//! Leprechaun Name Generator server
//!
//! Serves the name generator API, persisting generated names to a JSON file.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leprechaun_names::api::create_router;
use leprechaun_names::config::{APP_NAME, APP_VERSION};
use leprechaun_names::{spawn_persistence_task, AppState, Config, NameStore};

/// Main entry point for the name generator server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Load the name store from its JSON file
/// 4. Start the background auto-save task
/// 5. Load certificate templates and create the Axum router
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM stop the auto-save task and flush the store
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leprechaun_names=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let config = Config::from_env();
    info!(
        "Configuration loaded: db_file={}, auto_save_interval={}s, port={}, templates={}",
        config.db_file.display(),
        config.auto_save_interval,
        config.server_port,
        config.template_dir.display()
    );

    let store = Arc::new(NameStore::load(&config.db_file));
    info!("Name store initialized with {} names", store.count());

    let worker = spawn_persistence_task(store.clone(), config.auto_save_period());

    let state = AppState::from_config(&config, store);
    info!("Loaded {} PDF templates", state.templates.len());
    if config.rate_limit_enabled {
        info!(
            "Rate limiting: {} per minute for name generation, {} per minute for PDFs",
            config.rate_limit_generate, config.rate_limit_pdf
        );
    }
    if config.trust_proxy {
        info!("Trusting X-Forwarded-For from the reverse proxy");
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    // Flush even if the server stopped with an error
    if let Err(err) = worker.shutdown().await {
        error!("Final flush failed: {}", err);
    }
    served.context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
