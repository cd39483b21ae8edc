// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Terrain elevation lookups.
//!
//! Handles:
//! - Single-point queries against the terrain height API
//! - Fixed-window batching (bounded concurrency, pause between windows)
//! - Per-point failure fallback to the preceding sample's elevation

use crate::models::{Coordinate, ElevationPoint};
use crate::services::distance::haversine;
use futures_util::future::join_all;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// Public terrain point API (Kartverket height data).
pub const DEFAULT_TERRAIN_API_URL: &str = "https://ws.geonorge.no/hoydedata/v1/punkt";
/// EPSG code of the reference frame the API is queried in (ETRS89 geographic).
pub const DEFAULT_CRS_CODE: u32 = 4258;
/// Lookups resolved concurrently per window.
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Pause between consecutive windows.
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_millis(100);

/// Errors for a single elevation lookup.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    #[error("Terrain request failed: {0}")]
    Request(String),

    #[error("Terrain API returned HTTP {0}")]
    Status(u16),

    #[error("Unexpected terrain response: {0}")]
    Shape(String),
}

/// Anything that can resolve the terrain elevation of a point.
pub trait ElevationSource: Send + Sync {
    /// Elevation in meters, rounded to the nearest meter.
    fn resolve(&self, point: Coordinate) -> impl Future<Output = Result<f64, TerrainError>> + Send;
}

/// HTTP client for the terrain point API.
#[derive(Clone)]
pub struct TerrainClient {
    http: reqwest::Client,
    base_url: String,
    crs: u32,
}

impl TerrainClient {
    pub fn new(base_url: impl Into<String>, crs: u32, timeout: Duration) -> Result<Self, TerrainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TerrainError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            crs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ElevationSource for TerrainClient {
    async fn resolve(&self, point: Coordinate) -> Result<f64, TerrainError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("koordsys", self.crs.to_string()),
                ("nord", point.lat.to_string()),
                ("ost", point.lng.to_string()),
                ("geojson", "false".to_string()),
            ])
            .send()
            .await
            .map_err(|e| TerrainError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TerrainError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TerrainError::Shape(format!("JSON parse error: {}", e)))?;

        extract_elevation(body)
    }
}

/// Response body of the point API. Only the fields we read are modeled.
#[derive(Debug, Deserialize)]
struct PointResponse {
    #[serde(rename = "punkter")]
    points: Vec<TerrainPoint>,
}

#[derive(Debug, Deserialize)]
struct TerrainPoint {
    #[serde(rename = "z")]
    elevation: Option<f64>,
}

/// Read and round the first point's elevation.
fn extract_elevation(body: serde_json::Value) -> Result<f64, TerrainError> {
    let response: PointResponse =
        serde_json::from_value(body).map_err(|e| TerrainError::Shape(e.to_string()))?;

    let elevation = response
        .points
        .first()
        .ok_or_else(|| TerrainError::Shape("empty point array".to_string()))?
        .elevation
        .ok_or_else(|| TerrainError::Shape("point has no elevation".to_string()))?;

    if !elevation.is_finite() {
        return Err(TerrainError::Shape("elevation is not finite".to_string()));
    }

    Ok(elevation.round())
}

/// Window size and pause for batched lookups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchWindow {
    pub size: usize,
    pub pause: Duration,
}

impl Default for BatchWindow {
    fn default() -> Self {
        Self {
            size: DEFAULT_BATCH_SIZE,
            pause: DEFAULT_BATCH_PAUSE,
        }
    }
}

/// Result of a batch lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResolution {
    /// One point per input, in input order
    pub points: Vec<ElevationPoint>,
    /// Lookups that fell back to the preceding elevation
    pub failed: usize,
}

/// Resolve elevations for every point, `window.size` lookups at a time.
///
/// Never fails and never drops points: a failed lookup reuses the previous
/// output elevation (0 for the first point). Cumulative distance is computed
/// from the coordinates alone.
pub async fn resolve_batch<S: ElevationSource>(
    source: &S,
    points: &[Coordinate],
    window: BatchWindow,
) -> BatchResolution {
    let size = window.size.max(1);
    let mut resolved: Vec<ElevationPoint> = Vec::with_capacity(points.len());
    let mut failed = 0;
    let mut distance = 0.0;
    let mut previous: Option<Coordinate> = None;

    for (window_index, chunk) in points.chunks(size).enumerate() {
        if window_index > 0 && !window.pause.is_zero() {
            tokio::time::sleep(window.pause).await;
        }

        let lookups = join_all(chunk.iter().map(|&p| source.resolve(p))).await;

        for (offset, (point, lookup)) in chunk.iter().zip(lookups).enumerate() {
            if let Some(prev) = previous {
                distance += haversine(prev, *point);
            }
            previous = Some(*point);

            let elevation = match lookup {
                Ok(elevation) => elevation,
                Err(e) => {
                    failed += 1;
                    let fallback = resolved.last().map_or(0.0, |p| p.elevation);
                    tracing::warn!(
                        index = window_index * size + offset,
                        lat = point.lat,
                        lng = point.lng,
                        fallback,
                        error = %e,
                        "Elevation lookup failed, using preceding elevation"
                    );
                    fallback
                }
            };

            resolved.push(ElevationPoint {
                lat: point.lat,
                lng: point.lng,
                elevation,
                distance,
            });
        }
    }

    BatchResolution {
        points: resolved,
        failed,
    }
}
