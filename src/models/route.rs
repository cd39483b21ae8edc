// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Planned route model.
//!
//! Elevation state is an explicit enum in memory. On the wire a route keeps the
//! document shape shared with the web client: `elevationGain: -1` marks a
//! computation in flight, absent fields mean no elevation data.

use crate::models::coordinate::{validate_finite_coordinates, Coordinate};
use crate::models::elevation::ElevationSummary;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Reserved `elevationGain` value for a computation in flight.
pub const PENDING_ELEVATION_GAIN: f64 = -1.0;

/// Default stroke color for new routes.
pub const DEFAULT_ROUTE_COLOR: &str = "#3b82f6";

/// Elevation state of a route.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ElevationStatus {
    /// Profile computation has been requested but has not settled yet.
    Pending,
    Computed(RouteElevation),
    /// No elevation data (never computed, or computation failed).
    #[default]
    Unavailable,
}

impl ElevationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ElevationStatus::Pending)
    }

    /// Elevation gain when computed.
    pub fn gain(&self) -> Option<f64> {
        match self {
            ElevationStatus::Computed(elevation) => Some(elevation.elevation_gain),
            ElevationStatus::Pending | ElevationStatus::Unavailable => None,
        }
    }
}

/// Elevation data stored on a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteElevation {
    pub elevation_gain: f64,
    pub profile: Option<ElevationStats>,
}

impl From<&ElevationSummary> for RouteElevation {
    fn from(summary: &ElevationSummary) -> Self {
        Self {
            elevation_gain: summary.elevation_gain,
            profile: Some(ElevationStats {
                total_ascent: summary.total_ascent,
                total_descent: summary.total_descent,
                min_elevation: summary.min_elevation,
                max_elevation: summary.max_elevation,
            }),
        }
    }
}

/// Per-route elevation statistics (`elevationProfile` in the document).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationStats {
    pub total_ascent: f64,
    pub total_descent: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
}

/// A route drawn by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(from = "RouteDocument", into = "RouteDocument")]
pub struct Route {
    #[validate(length(min = 1, max = 128))]
    pub key: String,
    #[validate(length(max = 200))]
    pub name: String,
    #[validate(length(max = 32))]
    pub color: String,
    #[validate(
        length(min = 2, message = "a route needs at least two waypoints"),
        custom(function = "validate_finite_coordinates")
    )]
    pub waypoints: Vec<Coordinate>,
    pub elevation: ElevationStatus,
}

impl Route {
    pub fn new(key: impl Into<String>, name: impl Into<String>, waypoints: Vec<Coordinate>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            color: DEFAULT_ROUTE_COLOR.to_string(),
            waypoints,
            elevation: ElevationStatus::Unavailable,
        }
    }

    /// Copy of this route with a different elevation state.
    pub fn with_elevation(&self, elevation: ElevationStatus) -> Self {
        Self {
            elevation,
            ..self.clone()
        }
    }
}

/// Serialized shape of a route.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteDocument {
    #[serde(rename = "_key")]
    key: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    waypoints: Vec<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elevation_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elevation_profile: Option<ElevationStats>,
}

impl From<RouteDocument> for Route {
    fn from(doc: RouteDocument) -> Self {
        let elevation = match doc.elevation_gain {
            Some(gain) if gain < 0.0 => ElevationStatus::Pending,
            Some(gain) => ElevationStatus::Computed(RouteElevation {
                elevation_gain: gain,
                profile: doc.elevation_profile,
            }),
            None => ElevationStatus::Unavailable,
        };

        Self {
            key: doc.key,
            name: doc.name,
            color: doc.color,
            waypoints: doc.waypoints,
            elevation,
        }
    }
}

impl From<Route> for RouteDocument {
    fn from(route: Route) -> Self {
        let (elevation_gain, elevation_profile) = match route.elevation {
            ElevationStatus::Pending => (Some(PENDING_ELEVATION_GAIN), None),
            ElevationStatus::Computed(e) => (Some(e.elevation_gain), e.profile),
            ElevationStatus::Unavailable => (None, None),
        };

        Self {
            key: route.key,
            name: route.name,
            color: route.color,
            waypoints: route.waypoints,
            elevation_gain,
            elevation_profile,
        }
    }
}
