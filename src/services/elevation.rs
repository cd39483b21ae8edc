// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Elevation profile pipeline.
//!
//! Handles the full computation behind the elevation endpoint:
//! 1. Validate the raw waypoints
//! 2. Densify them with the sampler
//! 3. Resolve elevations in fixed windows
//! 4. Reduce the samples to profile statistics

use crate::models::{Coordinate, RouteElevationProfile};
use crate::services::profile::{reduce, ProfileError};
use crate::services::sampler::{sample, sample_count, DEFAULT_SAMPLE_INTERVAL_METERS};
use crate::services::terrain::{resolve_batch, BatchWindow, ElevationSource, TerrainClient};

/// Upper bound on samples per computation (about 500 km at 100 m spacing).
pub const DEFAULT_MAX_SAMPLE_POINTS: usize = 5000;

/// Tunables for the elevation pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub interval_meters: f64,
    pub window: BatchWindow,
    pub max_sample_points: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            interval_meters: DEFAULT_SAMPLE_INTERVAL_METERS,
            window: BatchWindow::default(),
            max_sample_points: DEFAULT_MAX_SAMPLE_POINTS,
        }
    }
}

/// Errors from the elevation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ElevationError {
    #[error("At least 2 waypoints are required, got {0}")]
    TooFewWaypoints(usize),

    #[error("Waypoint {0} is not a finite coordinate")]
    NonFiniteCoordinate(usize),

    #[error("Route needs {samples} elevation samples, limit is {max}")]
    TooManySamples { samples: usize, max: usize },

    #[error("Elevation provider unavailable: all {0} lookups failed")]
    ProviderUnavailable(usize),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl ElevationError {
    /// Whether the caller sent something we can't compute.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ElevationError::TooFewWaypoints(_)
                | ElevationError::NonFiniteCoordinate(_)
                | ElevationError::TooManySamples { .. }
        )
    }
}

/// Computes elevation profiles from raw route waypoints.
pub struct ElevationService<S = TerrainClient> {
    source: S,
    settings: PipelineSettings,
}

impl<S: ElevationSource> ElevationService<S> {
    pub fn new(source: S, settings: PipelineSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Sample, resolve, and reduce a route.
    ///
    /// Individual lookup failures are absorbed by the batch resolver. Only a
    /// run in which no lookup succeeded is reported as a provider failure.
    pub async fn compute_profile(
        &self,
        waypoints: &[Coordinate],
    ) -> Result<RouteElevationProfile, ElevationError> {
        if waypoints.len() < 2 {
            return Err(ElevationError::TooFewWaypoints(waypoints.len()));
        }
        if let Some(index) = waypoints.iter().position(|c| !c.is_finite()) {
            return Err(ElevationError::NonFiniteCoordinate(index));
        }

        // Checked before densifying so oversized routes are never built.
        let needed = sample_count(waypoints, self.settings.interval_meters);
        if needed > self.settings.max_sample_points {
            return Err(ElevationError::TooManySamples {
                samples: needed,
                max: self.settings.max_sample_points,
            });
        }

        let samples = sample(waypoints, self.settings.interval_meters);

        tracing::debug!(
            waypoints = waypoints.len(),
            samples = samples.len(),
            "Resolving elevation samples"
        );

        let batch = resolve_batch(&self.source, &samples, self.settings.window).await;
        if batch.failed == batch.points.len() {
            tracing::error!(
                samples = samples.len(),
                "Every elevation lookup failed"
            );
            return Err(ElevationError::ProviderUnavailable(batch.failed));
        }

        let failed = batch.failed;
        let profile = reduce(batch.points)?;

        tracing::info!(
            samples = samples.len(),
            failed,
            elevation_gain = profile.elevation_gain,
            distance = profile.distance,
            "Elevation profile computed"
        );

        Ok(profile)
    }
}
