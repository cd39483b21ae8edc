// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod coordinate;
pub mod elevation;
pub mod route;
pub mod trip;

pub use coordinate::Coordinate;
pub use elevation::{ElevationPoint, ElevationSummary, RouteElevationProfile};
pub use route::{ElevationStats, ElevationStatus, Route, RouteElevation};
pub use trip::Trip;
