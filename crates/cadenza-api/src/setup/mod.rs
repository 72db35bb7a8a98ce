//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use cadenza_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;
    tracing::info!(environment = %config.environment(), "Configuration loaded and validated successfully");

    let pool = database::setup_database(config).await?;
    let storage = storage::setup_storage(config).await?;
    let push = services::setup_push(config)?;

    let state = services::build_state(config, services::Stores::postgres(pool), storage, push);
    let router = routes::setup_routes(config, state.clone())?;

    Ok((state, router))
}
