//! mediavault API binary.

use anyhow::{Context, Result};
use mediavault_core::Config;
use mediavault_storage::{LocalStorage, S3Storage, Storage};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod auth;
mod error;
mod handlers;
mod routes;
mod services;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = mediavault_db::setup_database(&config).await?;

    let storage: Arc<dyn Storage> = match config.storage_backend.as_str() {
        "local" => Arc::new(
            LocalStorage::new(
                config.local_storage_path.clone(),
                config.local_storage_base_url.clone(),
            )
            .await
            .context("Failed to initialize local storage")?,
        ),
        _ => Arc::new(
            S3Storage::new(
                config.s3_bucket.clone(),
                config.s3_region.clone(),
                config.s3_endpoint.clone(),
            )
            .context("Failed to initialize object storage")?,
        ),
    };

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let state = Arc::new(AppState::new(config, pool, storage));
    let router = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "mediavault API listening");

    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}
