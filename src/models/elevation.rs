// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Elevation sample and profile models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One resolved sample along a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationPoint {
    pub lat: f64,
    pub lng: f64,
    /// Terrain elevation in meters, rounded to the nearest meter
    pub elevation: f64,
    /// Cumulative great-circle distance from the first sample (meters)
    pub distance: f64,
}

/// Full elevation profile of a sampled route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteElevationProfile {
    pub points: Vec<ElevationPoint>,
    pub total_ascent: f64,
    pub total_descent: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    /// Gross ascent (always equal to `total_ascent`)
    pub elevation_gain: f64,
    /// Total sampled distance in meters
    pub distance: f64,
}

impl RouteElevationProfile {
    /// Profile statistics without the sample points.
    pub fn summary(&self) -> ElevationSummary {
        ElevationSummary {
            elevation_gain: self.elevation_gain,
            total_ascent: self.total_ascent,
            total_descent: self.total_descent,
            min_elevation: self.min_elevation,
            max_elevation: self.max_elevation,
            distance: self.distance,
        }
    }
}

/// Profile statistics as returned by the elevation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ElevationSummary {
    pub elevation_gain: f64,
    pub total_ascent: f64,
    pub total_descent: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub distance: f64,
}
