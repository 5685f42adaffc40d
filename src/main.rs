//! pdf-pager
//!
//! Serves single pages of a large PDF as standalone PDF documents, with the
//! whole file available for range requests.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_pager::config::{Config, LogFormat};
use pdf_pager::document::DocumentService;
use pdf_pager::formats::MupdfExtractor;
use pdf_pager::routes;
use pdf_pager::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pdf_pager=debug,tower_http=debug".into());
    match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    // Load configuration
    let config = Config::from_env();

    tracing::info!("Starting pdf-pager v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Source document: {}", config.document.path.display());
    tracing::info!(
        "Page cache capacity: {}, environment: {:?}",
        config.document.page_cache_capacity,
        config.http.environment
    );

    let document = DocumentService::open(
        &config.document.path,
        Arc::new(MupdfExtractor::new()),
        config.pipeline(),
    )
    .await
    .with_context(|| format!("Failed to open {}", config.document.path.display()))?;

    if config.document.warm_up {
        document.warm_up();
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.server.host, config.server.port))?;

    let state = AppState::new(config, document);
    let app = routes::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("pdf-pager listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    state.shutdown();
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Graceful shutdown signal handler
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
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
