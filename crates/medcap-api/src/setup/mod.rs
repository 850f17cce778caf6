//! Application setup and initialization
//!
//! All initialization logic lives here rather than in main.rs so the router
//! can also be assembled by integration tests with test doubles.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use medcap_captioner::{BlipCaptioner, CaptionService};
use medcap_core::Config;
use medcap_storage::{LocalStorage, OverwritePolicy};

use crate::state::AppState;

/// Initialize the entire application: telemetry, storage, model, routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_tracing();
    tracing::info!("Configuration loaded and validated successfully");

    let storage = LocalStorage::new(config.upload_root(), OverwritePolicy::Replace)
        .await
        .context("Failed to initialize upload storage")?;

    // Loading BLIP weights takes a while; do it on the blocking pool before
    // accepting traffic.
    let model_dir = config.model_dir().to_path_buf();
    tracing::info!(model_dir = %model_dir.display(), "Loading caption model");
    let model = tokio::task::spawn_blocking(move || BlipCaptioner::new(&model_dir))
        .await?
        .context("Failed to load caption model")?;
    tracing::info!("Caption model loaded");

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(storage),
        Arc::new(CaptionService::new(model)),
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
