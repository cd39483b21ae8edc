// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Waypoint capture state machine.

use crate::models::route::DEFAULT_ROUTE_COLOR;
use crate::models::{Coordinate, ElevationStatus, Route};
use crate::planner::{
    ElevationApi, PendingElevation, PlannerError, RouteRepository, SaveOrchestrator,
};
use std::sync::Arc;

/// Name given to routes until the user renames them.
pub const DEFAULT_ROUTE_NAME: &str = "New route";

/// A route being drawn or edited.
///
/// Waypoints are an immutable snapshot; every edit builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRoute {
    pub key: String,
    pub name: String,
    pub color: String,
    pub waypoints: Arc<[Coordinate]>,
    /// Editing an existing route rather than drawing a new one
    pub editing: bool,
}

impl DraftRoute {
    fn with_waypoints(&self, waypoints: Vec<Coordinate>) -> Self {
        Self {
            waypoints: waypoints.into(),
            ..self.clone()
        }
    }

    fn to_route(&self) -> Route {
        Route {
            key: self.key.clone(),
            name: self.name.clone(),
            color: self.color.clone(),
            waypoints: self.waypoints.to_vec(),
            elevation: ElevationStatus::Unavailable,
        }
    }
}

/// What the planner is doing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PlannerState {
    #[default]
    Idle,
    /// Next map click places a camping spot.
    AddingSpot,
    DrawingRoute(DraftRoute),
    /// The draft has been handed to the orchestrator.
    Persisting(DraftRoute),
}

impl PlannerState {
    pub fn name(&self) -> &'static str {
        match self {
            PlannerState::Idle => "idle",
            PlannerState::AddingSpot => "adding a spot",
            PlannerState::DrawingRoute(_) => "drawing a route",
            PlannerState::Persisting(_) => "saving a route",
        }
    }
}

/// Outcome of a map click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapClick {
    Ignored,
    WaypointAdded { count: usize },
    /// The caller stores the spot; the planner is back to idle.
    SpotPlaced(Coordinate),
}

/// Interactive route planner for one trip.
pub struct RoutePlanner<E, R> {
    orchestrator: SaveOrchestrator<E, R>,
    state: PlannerState,
}

impl<E: ElevationApi, R: RouteRepository> RoutePlanner<E, R> {
    pub fn new(orchestrator: SaveOrchestrator<E, R>) -> Self {
        Self {
            orchestrator,
            state: PlannerState::Idle,
        }
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn orchestrator(&self) -> &SaveOrchestrator<E, R> {
        &self.orchestrator
    }

    /// The draft being drawn, if any.
    pub fn draft(&self) -> Option<&DraftRoute> {
        match &self.state {
            PlannerState::DrawingRoute(draft) => Some(draft),
            _ => None,
        }
    }

    fn require_idle(&self, operation: &'static str) -> Result<(), PlannerError> {
        match self.state {
            PlannerState::Idle => Ok(()),
            _ => Err(PlannerError::InvalidState {
                operation,
                state: self.state.name(),
            }),
        }
    }

    /// Replace the draft, if there is one.
    fn update_draft(&mut self, f: impl FnOnce(&DraftRoute) -> Option<DraftRoute>) -> bool {
        let PlannerState::DrawingRoute(draft) = &self.state else {
            return false;
        };
        match f(draft) {
            Some(next) => {
                self.state = PlannerState::DrawingRoute(next);
                true
            }
            None => false,
        }
    }

    /// Start drawing a new route. Returns its key.
    pub fn start_route(&mut self) -> Result<String, PlannerError> {
        self.require_idle("start a route")?;

        let key = uuid::Uuid::new_v4().to_string();
        self.state = PlannerState::DrawingRoute(DraftRoute {
            key: key.clone(),
            name: DEFAULT_ROUTE_NAME.to_string(),
            color: DEFAULT_ROUTE_COLOR.to_string(),
            waypoints: Arc::from([]),
            editing: false,
        });
        tracing::debug!(key = %key, "Drawing new route");
        Ok(key)
    }

    /// Start editing an existing route's waypoints.
    pub fn edit_route(&mut self, key: &str) -> Result<(), PlannerError> {
        self.require_idle("edit a route")?;

        let trip = self.orchestrator.trip();
        let route = trip
            .route(key)
            .ok_or_else(|| PlannerError::UnknownRoute(key.to_string()))?;

        self.state = PlannerState::DrawingRoute(DraftRoute {
            key: route.key.clone(),
            name: route.name.clone(),
            color: route.color.clone(),
            waypoints: route.waypoints.as_slice().into(),
            editing: true,
        });
        Ok(())
    }

    pub fn start_adding_spot(&mut self) -> Result<(), PlannerError> {
        self.require_idle("add a spot")?;
        self.state = PlannerState::AddingSpot;
        Ok(())
    }

    pub fn map_click(&mut self, coord: Coordinate) -> MapClick {
        if !coord.is_finite() {
            return MapClick::Ignored;
        }

        match &self.state {
            PlannerState::AddingSpot => {
                self.state = PlannerState::Idle;
                MapClick::SpotPlaced(coord)
            }
            PlannerState::DrawingRoute(draft) => {
                let mut waypoints = draft.waypoints.to_vec();
                waypoints.push(coord);
                let count = waypoints.len();
                self.state = PlannerState::DrawingRoute(draft.with_waypoints(waypoints));
                MapClick::WaypointAdded { count }
            }
            PlannerState::Idle | PlannerState::Persisting(_) => MapClick::Ignored,
        }
    }

    /// Drop the last waypoint. The first waypoint is never removed this way.
    pub fn undo_last_point(&mut self) -> bool {
        self.update_draft(|draft| {
            if draft.waypoints.len() <= 1 {
                return None;
            }
            let waypoints = draft.waypoints[..draft.waypoints.len() - 1].to_vec();
            Some(draft.with_waypoints(waypoints))
        })
    }

    /// Drop the waypoint at `index`. May leave fewer than 2 waypoints.
    pub fn remove_waypoint(&mut self, index: usize) -> bool {
        self.update_draft(|draft| {
            if index >= draft.waypoints.len() {
                return None;
            }
            let mut waypoints = draft.waypoints.to_vec();
            waypoints.remove(index);
            Some(draft.with_waypoints(waypoints))
        })
    }

    pub fn rename_draft(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        self.update_draft(|draft| {
            Some(DraftRoute {
                name,
                ..draft.clone()
            })
        })
    }

    pub fn recolor_draft(&mut self, color: impl Into<String>) -> bool {
        let color = color.into();
        self.update_draft(|draft| {
            Some(DraftRoute {
                color,
                ..draft.clone()
            })
        })
    }

    /// Save the draft (new route or edit) and go back to idle.
    ///
    /// On error the planner state is what it was before the call.
    pub async fn finish(&mut self) -> Result<PendingElevation, PlannerError> {
        let draft = match &self.state {
            PlannerState::DrawingRoute(draft) if draft.waypoints.len() >= 2 => draft.clone(),
            PlannerState::DrawingRoute(draft) => {
                return Err(PlannerError::TooFewWaypoints {
                    count: draft.waypoints.len(),
                })
            }
            other => {
                return Err(PlannerError::InvalidState {
                    operation: "finish",
                    state: other.name(),
                })
            }
        };

        self.state = PlannerState::Persisting(draft.clone());

        match self.orchestrator.submit(draft.to_route()).await {
            Ok(pending) => {
                tracing::info!(
                    key = %draft.key,
                    waypoints = draft.waypoints.len(),
                    editing = draft.editing,
                    "Route saved"
                );
                self.state = PlannerState::Idle;
                Ok(pending)
            }
            Err(e) => {
                self.state = PlannerState::DrawingRoute(draft);
                Err(e)
            }
        }
    }

    /// Discard the draft or stop placing a spot. Nothing is stored.
    pub fn cancel(&mut self) {
        if let PlannerState::DrawingRoute(draft) = &self.state {
            tracing::debug!(key = %draft.key, "Route draft discarded");
        }
        self.state = PlannerState::Idle;
    }
}
