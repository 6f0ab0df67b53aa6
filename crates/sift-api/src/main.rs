//! Sift API: natural-language user search server.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sift_api::config::ApiConfig;
use sift_api::routes;
use sift_api::state::AppState;
use sift_api::store::MemoryRecordStore;
use sift_engine::Resolver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sift-api starting");

    let config = ApiConfig::from_env();
    let engine_config = config.load_engine_config()?;

    let resolver = Arc::new(Resolver::from_config(&engine_config).await);
    tracing::info!(tiers = ?resolver.tier_names(), "resolver ready");

    if resolver.has_ai() {
        let warm = resolver.clone();
        tokio::spawn(async move {
            warm.warmup().await;
        });
    }

    let store = Arc::new(MemoryRecordStore::with_sample_data());
    tracing::info!(records = store.len(), "using in-memory record store");

    let state = AppState::new(resolver.clone(), store);
    let app = routes::build_router(state);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    resolver.shutdown().await;
    tracing::info!("sift-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
