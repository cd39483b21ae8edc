// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip and route storage endpoints.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Route, Trip};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_ID_LEN: usize = 128;

/// Trip routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/trips/{trip_id}", get(get_trip).put(put_trip))
        .route(
            "/api/trips/{trip_id}/routes/{key}",
            put(put_route).delete(delete_route),
        )
        .route("/api/trips/{trip_id}/geojson", get(get_trip_geojson))
}

/// Reject IDs that can't be a trip ID or route key.
fn validate_id(kind: &str, id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid {}", kind)))
    }
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

fn validate_route(route: &Route) -> Result<()> {
    route
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Route {}: {}", route.key, e)))
}

async fn load_trip(state: &AppState, user: &AuthUser, trip_id: &str) -> Result<Trip> {
    state
        .db
        .get_trip(&user.user_id, trip_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trip {}", trip_id)))
}

async fn get_trip(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(trip_id): Path<String>,
) -> Result<Json<Trip>> {
    validate_id("trip ID", &trip_id)?;
    Ok(Json(load_trip(&state, &user, &trip_id).await?))
}

/// Create or overwrite a whole trip.
async fn put_trip(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(trip_id): Path<String>,
    payload: std::result::Result<Json<Trip>, JsonRejection>,
) -> Result<Json<Trip>> {
    validate_id("trip ID", &trip_id)?;
    let trip = json_body(payload)?;

    if trip.id != trip_id {
        return Err(AppError::BadRequest(
            "Trip ID in body does not match path".to_string(),
        ));
    }
    for route in &trip.routes {
        validate_route(route)?;
    }

    state.db.put_trip(&user.user_id, &trip).await?;
    tracing::info!(
        user_id = %user.user_id,
        trip_id = %trip.id,
        routes = trip.routes.len(),
        "Trip saved"
    );

    Ok(Json(trip))
}

/// Trip routes as a GeoJSON FeatureCollection.
async fn get_trip_geojson(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(trip_id): Path<String>,
) -> Result<Json<geojson::FeatureCollection>> {
    validate_id("trip ID", &trip_id)?;
    let trip = load_trip(&state, &user, &trip_id).await?;
    Ok(Json(trip.routes_geojson()))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RouteWriteResponse {
    pub success: bool,
    /// An existing route with this key was replaced (vs. appended)
    pub replaced: bool,
    pub route_count: usize,
}

/// Replace a route by key. New keys are appended.
async fn put_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((trip_id, key)): Path<(String, String)>,
    payload: std::result::Result<Json<Route>, JsonRejection>,
) -> Result<Json<RouteWriteResponse>> {
    validate_id("trip ID", &trip_id)?;
    validate_id("route key", &key)?;
    let route = json_body(payload)?;

    if route.key != key {
        return Err(AppError::BadRequest(
            "Route key in body does not match path".to_string(),
        ));
    }
    validate_route(&route)?;

    let write = state.db.replace_route(&user.user_id, &trip_id, route).await?;

    Ok(Json(RouteWriteResponse {
        success: true,
        replaced: write.replaced,
        route_count: write.route_count,
    }))
}

async fn delete_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((trip_id, key)): Path<(String, String)>,
) -> Result<StatusCode> {
    validate_id("trip ID", &trip_id)?;
    validate_id("route key", &key)?;

    if state.db.delete_route(&user.user_id, &trip_id, &key).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Route {} in trip {}", key, trip_id)))
    }
}
