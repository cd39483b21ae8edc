// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tripline: route planning with terrain elevation profiles.
//!
//! This crate provides the backend API that computes elevation profiles for
//! drawn routes and stores trips, plus the planner library that drives route
//! drawing and saves routes optimistically while elevation is computed.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod planner;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::TripDb;
use services::{ElevationService, TerrainClient, TerrainError};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: TripDb,
    pub elevation: ElevationService<TerrainClient>,
}

impl AppState {
    /// Build state around an existing trip store.
    pub fn new(config: Config, db: TripDb) -> Result<Self, TerrainError> {
        let terrain = TerrainClient::new(
            config.terrain_api_url.clone(),
            config.terrain_crs,
            config.terrain_timeout,
        )?;
        let elevation = ElevationService::new(terrain, config.pipeline_settings());

        Ok(Self {
            config,
            db,
            elevation,
        })
    }
}
