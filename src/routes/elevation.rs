// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Elevation profile endpoint.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::coordinate::validate_finite_coordinates;
use crate::models::{Coordinate, ElevationSummary};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Elevation routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/elevation/profile", post(compute_profile))
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ElevationProfileRequest {
    #[validate(
        length(min = 2, message = "at least 2 waypoints are required"),
        custom(function = "validate_finite_coordinates")
    )]
    pub waypoints: Vec<Coordinate>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ElevationProfileResponse {
    pub success: bool,
    pub elevation_profile: ElevationSummary,
}

/// Compute the elevation profile of a polyline.
///
/// Stateless: nothing is stored. Only a run in which the terrain provider
/// never answered is reported as a 500.
async fn compute_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<ElevationProfileRequest>, JsonRejection>,
) -> Result<Json<ElevationProfileResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    tracing::debug!(
        user_id = %user.user_id,
        waypoints = request.waypoints.len(),
        "Elevation profile requested"
    );

    let profile = state.elevation.compute_profile(&request.waypoints).await?;

    Ok(Json(ElevationProfileResponse {
        success: true,
        elevation_profile: profile.summary(),
    }))
}
