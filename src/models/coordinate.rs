// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geographic coordinate model.

use serde::{Deserialize, Serialize};
use validator::ValidationError;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A point in WGS84-style geographic degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Coordinate {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Planar interpolation in lat/lng space (`t` in `[0, 1]`).
    pub fn lerp(self, other: Coordinate, t: f64) -> Coordinate {
        Coordinate {
            lat: self.lat + (other.lat - self.lat) * t,
            lng: self.lng + (other.lng - self.lng) * t,
        }
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Coord { x: c.lng, y: c.lat }
    }
}

impl From<geo::Coord<f64>> for Coordinate {
    fn from(c: geo::Coord<f64>) -> Self {
        Coordinate { lat: c.y, lng: c.x }
    }
}

/// Validator hook: every coordinate in the list must be finite.
pub fn validate_finite_coordinates(coords: &[Coordinate]) -> Result<(), ValidationError> {
    match coords.iter().position(|c| !c.is_finite()) {
        Some(index) => {
            let mut err = ValidationError::new("non_finite_coordinate");
            err.message = Some(format!("waypoint {} is not a finite coordinate", index).into());
            Err(err)
        }
        None => Ok(()),
    }
}
