// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tripline::config::Config;
use tripline::db::TripDb;
use tripline::routes::create_router;
use tripline::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> TripDb {
    TripDb::connect("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app with in-memory storage and the default (unreachable)
/// terrain provider. Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(
        AppState::new(config, TripDb::in_memory()).expect("Failed to build app state"),
    );
    (create_router(state.clone()), state)
}

/// Test app whose elevation pipeline talks to `terrain`.
#[allow(dead_code)]
pub fn create_test_app_with_terrain(terrain: &MockTerrain) -> (Router, Arc<AppState>) {
    create_test_app_with_config(Config {
        terrain_api_url: terrain.url.clone(),
        ..Config::test_default()
    })
}

/// Create a session token for `user_id`.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    tripline::middleware::auth::create_jwt(user_id, signing_key).unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve `app` on an ephemeral local port. Returns the base URL.
#[allow(dead_code)]
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// How the mock terrain API answers.
#[allow(dead_code)]
#[derive(Clone, Copy, Debug)]
pub enum TerrainMode {
    /// `z` is 100 m per 0.001 degrees of longitude east of 10°E.
    Slope,
    /// Like `Slope`, but every point at or east of 10.0005°E returns 503.
    FailEast,
    /// Every request returns 500.
    Failing,
    /// Every request returns a body that is not the expected shape.
    Garbage,
}

/// In-process stand-in for the terrain point API.
#[allow(dead_code)]
pub struct MockTerrain {
    /// Full point endpoint URL
    pub url: String,
    pub hits: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockTerrain {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct TerrainState {
    mode: TerrainMode,
    hits: Arc<AtomicUsize>,
}

async fn terrain_point(
    State(state): State<TerrainState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let east: f64 = match params.get("ost").and_then(|v| v.parse().ok()) {
        Some(v) => v,
        None => return StatusCode::BAD_REQUEST.into_response(),
    };
    if params.get("koordsys").map(String::as_str) != Some("4258") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let z = (east - 10.0) * 100_000.0;
    match state.mode {
        TerrainMode::Failing => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        TerrainMode::Garbage => Json(serde_json::json!({ "punkter": [] })).into_response(),
        TerrainMode::FailEast if east >= 10.0005 => {
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
        TerrainMode::Slope | TerrainMode::FailEast => Json(serde_json::json!({
            "koordsys": 4258,
            "punkter": [{ "x": east, "y": 60.0, "z": z, "datakilde": "dtm1" }]
        }))
        .into_response(),
    }
}

/// Start a mock terrain API on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_terrain(mode: TerrainMode) -> MockTerrain {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/punkt", get(terrain_point))
        .with_state(TerrainState {
            mode,
            hits: hits.clone(),
        });

    let base = serve(app).await;
    MockTerrain {
        url: format!("{}/punkt", base),
        hits,
    }
}
