// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Elevation profile aggregation.

use crate::models::{ElevationPoint, RouteElevationProfile};

/// Errors from profile aggregation.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("Cannot build an elevation profile from zero points")]
    Empty,
}

/// Reduce resolved samples to ascent/descent/extremes.
///
/// Ascent is gross: every positive step counts, so a route that climbs and
/// descends back reports its full climb as `elevation_gain`.
pub fn reduce(points: Vec<ElevationPoint>) -> Result<RouteElevationProfile, ProfileError> {
    let first = points.first().ok_or(ProfileError::Empty)?;

    let mut total_ascent = 0.0;
    let mut total_descent = 0.0;
    let mut min_elevation = first.elevation;
    let mut max_elevation = first.elevation;

    for pair in points.windows(2) {
        let delta = pair[1].elevation - pair[0].elevation;
        if delta > 0.0 {
            total_ascent += delta;
        } else if delta < 0.0 {
            total_descent -= delta;
        }
        min_elevation = min_elevation.min(pair[1].elevation);
        max_elevation = max_elevation.max(pair[1].elevation);
    }

    let distance = points.last().map_or(0.0, |p| p.distance);

    Ok(RouteElevationProfile {
        points,
        total_ascent,
        total_descent,
        min_elevation,
        max_elevation,
        elevation_gain: total_ascent,
        distance,
    })
}
