//! Application setup and initialization
//!
//! Startup order: telemetry, metadata store, storage and pipelines, state, routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::Result;
use std::sync::Arc;
use vidrelay_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(crate::telemetry::json_requested())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );
    crate::error::set_production_mode(config.is_production());

    let store = database::setup_database(&config).await?;
    let pipelines = storage::setup_pipelines(&config, store.clone()).await?;

    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        pipelines.video,
        pipelines.thumbnail,
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
