// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tripline API Server
//!
//! Computes terrain elevation profiles for planned routes and stores the
//! trips they belong to.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripline::{config::Config, db::TripDb, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Tripline API");

    let db = match &config.gcp_project_id {
        Some(project_id) => TripDb::connect(project_id).await?,
        None => {
            tracing::warn!("GCP_PROJECT_ID not set, trips are kept in memory only");
            TripDb::in_memory()
        }
    };

    tracing::info!(
        terrain_api = %config.terrain_api_url,
        crs = config.terrain_crs,
        interval_meters = config.sample_interval_meters,
        batch_size = config.batch_size,
        batch_pause_ms = config.batch_pause.as_millis() as u64,
        "Elevation pipeline configured"
    );

    let state = Arc::new(AppState::new(config.clone(), db)?);

    let app = tripline::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tripline=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
