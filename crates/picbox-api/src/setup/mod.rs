//! Application setup and initialization
//!
//! Everything `main` needs to go from a `Config` to a serving router. Integration tests call
//! `initialize_app` directly with a config pointing at a temporary directory.

pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use picbox_core::{AllowList, Config};
use std::sync::Arc;

/// Initialize the entire application
///
/// Does not touch the upload directory: it is created by the first upload.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    let allow_list =
        AllowList::new(config.allowed_types()).context("Invalid ALLOWED_TYPES pattern")?;

    let storage = storage::setup_storage(&config).await;

    let state = Arc::new(AppState::new(config.clone(), allow_list, storage));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
