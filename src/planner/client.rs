// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the Tripline API.

use crate::models::{Coordinate, ElevationSummary, Route, Trip};
use crate::planner::{ElevationApi, PlannerError, RouteRepository};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Authenticated API client used by the planner.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct ProfileRequest<'a> {
    waypoints: &'a [Coordinate],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    success: bool,
    elevation_profile: Option<ElevationSummary>,
    error: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PlannerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlannerError::Persistence(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// `{base}/api/trips/{trip_id}[/{suffix}...]` with escaped segments.
    fn trip_url(&self, trip_id: &str, suffix: &[&str]) -> String {
        let mut url = format!("{}/api/trips/{}", self.base_url, urlencoding::encode(trip_id));
        for segment in suffix {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    /// Load a trip.
    pub async fn fetch_trip(&self, trip_id: &str) -> Result<Trip, PlannerError> {
        let response = self
            .http
            .get(self.trip_url(trip_id, &[]))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| PlannerError::Persistence(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PlannerError::Persistence(format!(
                "Loading trip {} returned HTTP {}",
                trip_id,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PlannerError::Persistence(format!("JSON parse error: {}", e)))
    }
}

impl ElevationApi for ApiClient {
    async fn compute_profile(
        &self,
        waypoints: Vec<Coordinate>,
    ) -> Result<ElevationSummary, PlannerError> {
        let response = self
            .http
            .post(format!("{}/api/elevation/profile", self.base_url))
            .bearer_auth(&self.token)
            .json(&ProfileRequest {
                waypoints: &waypoints,
            })
            .send()
            .await
            .map_err(|e| PlannerError::Elevation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlannerError::Elevation(format!("HTTP {}", status)));
        }

        let body: ProfileResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::Elevation(format!("JSON parse error: {}", e)))?;

        match body {
            ProfileResponse {
                success: true,
                elevation_profile: Some(profile),
                ..
            } => Ok(profile),
            ProfileResponse { error, .. } => Err(PlannerError::Elevation(
                error.unwrap_or_else(|| "unsuccessful response".to_string()),
            )),
        }
    }
}

impl RouteRepository for ApiClient {
    async fn replace_route(&self, trip_id: &str, route: &Route) -> Result<(), PlannerError> {
        let response = self
            .http
            .put(self.trip_url(trip_id, &["routes", &route.key]))
            .bearer_auth(&self.token)
            .json(route)
            .send()
            .await
            .map_err(|e| PlannerError::Persistence(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlannerError::Persistence(format!("HTTP {}: {}", status, body)));
        }
        Ok(())
    }

    /// A route that is already gone counts as deleted.
    async fn delete_route(&self, trip_id: &str, key: &str) -> Result<(), PlannerError> {
        let response = self
            .http
            .delete(self.trip_url(trip_id, &["routes", key]))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| PlannerError::Persistence(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            status => Err(PlannerError::Persistence(format!("HTTP {}", status))),
        }
    }
}
