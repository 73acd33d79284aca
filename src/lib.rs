use anyhow::Result;
use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod aggregator;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod gate;
pub mod metrics;
pub mod routes;
pub mod session;
pub mod utils;

use crate::config::Config;
use crate::context::AppContext;

/// Serve the application on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app_context: Arc<AppContext>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = routes::create_router(app_context);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let bind_address = config.listen_address();

    tracing::info!(
        summary_url = %config.upstream.summary_url,
        timeout_secs = config.upstream.timeout.as_secs(),
        providers = config.upstream.providers.len(),
        "Summarization backend configured"
    );
    if config.upstream.providers.is_empty() {
        tracing::warn!("PROVIDERS is empty, no models can be selected");
    }

    let app_context = Arc::new(AppContext::from_config(config)?);

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("Summary gateway listening on {}", bind_address);

    serve(listener, app_context, async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received. Shutting down...");
    })
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
