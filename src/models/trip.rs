// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip document model.
//!
//! Only `routes` is interpreted here. Camping spots and any other fields are
//! carried through untouched.

use crate::models::route::{ElevationStatus, Route};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// A trip with its planned routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub camping_spots: Vec<serde_json::Value>,
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Fields owned by other parts of the application.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Trip {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Find a route by key.
    pub fn route(&self, key: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.key == key)
    }

    pub fn contains_route(&self, key: &str) -> bool {
        self.route(key).is_some()
    }

    /// Replace the route with the same key, or append it if the key is new.
    ///
    /// Returns the previous entry when one was replaced. The routes vector is
    /// swapped for a new one rather than edited in place.
    pub fn upsert_route(&mut self, route: Route) -> Option<Route> {
        let previous = self.route(&route.key).cloned();
        if previous.is_some() {
            self.replace_route(route);
        } else {
            let mut routes = self.routes.clone();
            routes.push(route);
            self.routes = routes;
        }
        previous
    }

    /// Replace an existing route by key. Returns `false` if the key is unknown.
    pub fn replace_route(&mut self, route: Route) -> bool {
        if !self.contains_route(&route.key) {
            return false;
        }
        self.routes = self
            .routes
            .iter()
            .map(|r| {
                if r.key == route.key {
                    route.clone()
                } else {
                    r.clone()
                }
            })
            .collect();
        true
    }

    /// Remove a route by key.
    pub fn remove_route(&mut self, key: &str) -> Option<Route> {
        let removed = self.route(key).cloned()?;
        self.routes = self.routes.iter().filter(|r| r.key != key).cloned().collect();
        Some(removed)
    }

    /// Turn leftover "calculating" placeholders into "no elevation".
    ///
    /// Only valid when no computation can still be in flight for this trip,
    /// e.g. right after loading it. Returns how many routes were settled.
    pub fn settle_pending(&mut self) -> usize {
        let pending = self.routes.iter().filter(|r| r.elevation.is_pending()).count();
        if pending > 0 {
            self.routes = self
                .routes
                .iter()
                .map(|r| {
                    if r.elevation.is_pending() {
                        r.with_elevation(ElevationStatus::Unavailable)
                    } else {
                        r.clone()
                    }
                })
                .collect();
        }
        pending
    }

    /// Export routes as a GeoJSON feature collection (one LineString each).
    pub fn routes_geojson(&self) -> FeatureCollection {
        let features = self
            .routes
            .iter()
            .map(|route| {
                let line: geo::LineString<f64> =
                    route.waypoints.iter().copied().map(geo::Coord::from).collect();

                let mut properties = JsonObject::new();
                properties.insert("key".to_string(), JsonValue::from(route.key.clone()));
                properties.insert("name".to_string(), JsonValue::from(route.name.clone()));
                properties.insert("color".to_string(), JsonValue::from(route.color.clone()));
                properties.insert(
                    "elevationGain".to_string(),
                    route
                        .elevation
                        .gain()
                        .map(JsonValue::from)
                        .unwrap_or(JsonValue::Null),
                );

                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(geojson::Value::from(&line))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}
