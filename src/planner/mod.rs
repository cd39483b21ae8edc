// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route planner: waypoint capture and optimistic saving.
//!
//! The planner runs next to the map UI. [`RoutePlanner`] tracks what the user
//! is drawing, [`SaveOrchestrator`] owns the trip view and keeps it in sync
//! with the API while elevation profiles are computed in the background.

pub mod client;
pub mod orchestrator;
pub mod state;

pub use client::ApiClient;
pub use orchestrator::{PendingElevation, SaveOrchestrator};
pub use state::{DraftRoute, MapClick, PlannerState, RoutePlanner};

use crate::models::{Coordinate, ElevationSummary, Route};
use std::future::Future;

/// Planner errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlannerError {
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("A route needs at least 2 waypoints, draft has {count}")]
    TooFewWaypoints { count: usize },

    #[error("No route with key {0}")]
    UnknownRoute(String),

    #[error("Failed to save route: {0}")]
    Persistence(String),

    #[error("Elevation profile unavailable: {0}")]
    Elevation(String),
}

/// Computes elevation summaries for raw waypoints.
pub trait ElevationApi: Send + Sync + 'static {
    fn compute_profile(
        &self,
        waypoints: Vec<Coordinate>,
    ) -> impl Future<Output = Result<ElevationSummary, PlannerError>> + Send;
}

/// Stores routes of a trip.
pub trait RouteRepository: Send + Sync + 'static {
    /// Replace the route with the same key, appending it if the key is new.
    fn replace_route(
        &self,
        trip_id: &str,
        route: &Route,
    ) -> impl Future<Output = Result<(), PlannerError>> + Send;

    fn delete_route(
        &self,
        trip_id: &str,
        key: &str,
    ) -> impl Future<Output = Result<(), PlannerError>> + Send;
}
