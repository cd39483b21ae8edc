// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route densification for elevation lookup.

use crate::models::Coordinate;
use crate::services::distance::haversine;
use geo::LineString;

/// Default maximum spacing between samples.
pub const DEFAULT_SAMPLE_INTERVAL_METERS: f64 = 100.0;

/// Densify a waypoint polyline so samples are at most `interval_meters` apart.
///
/// Segments longer than the interval get `floor(d / interval)` evenly spaced
/// points interpolated in lat/lng space. Every waypoint is kept, in order.
/// A non-positive or non-finite interval returns the waypoints unchanged.
pub fn sample(waypoints: &[Coordinate], interval_meters: f64) -> Vec<Coordinate> {
    if waypoints.len() < 2 || !interval_meters.is_finite() || interval_meters <= 0.0 {
        return waypoints.to_vec();
    }

    let line: LineString<f64> = waypoints.iter().copied().map(geo::Coord::from).collect();

    let mut samples = Vec::with_capacity(waypoints.len());
    samples.push(waypoints[0]);

    for segment in line.lines() {
        let start = Coordinate::from(segment.start);
        let end = Coordinate::from(segment.end);
        let length = haversine(start, end);

        let steps = interpolated_points(length, interval_meters);
        if steps > 0 {
            let divisions = (steps + 1) as f64;
            samples.extend((1..=steps).map(|i| start.lerp(end, i as f64 / divisions)));
        }

        samples.push(end);
    }

    samples
}

/// Number of samples [`sample`] produces for the same input, without building them.
pub fn sample_count(waypoints: &[Coordinate], interval_meters: f64) -> usize {
    if waypoints.len() < 2 || !interval_meters.is_finite() || interval_meters <= 0.0 {
        return waypoints.len();
    }

    waypoints.windows(2).fold(1usize, |count, pair| {
        let steps = interpolated_points(haversine(pair[0], pair[1]), interval_meters);
        count.saturating_add(steps).saturating_add(1)
    })
}

fn interpolated_points(length: f64, interval_meters: f64) -> usize {
    if length > interval_meters {
        (length / interval_meters).floor() as usize
    } else {
        0
    }
}
