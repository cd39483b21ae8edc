//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup. A `.env` file is honored for local
//! development.

use crate::services::elevation::{PipelineSettings, DEFAULT_MAX_SAMPLE_POINTS};
use crate::services::sampler::DEFAULT_SAMPLE_INTERVAL_METERS;
use crate::services::terrain::{
    BatchWindow, DEFAULT_BATCH_PAUSE, DEFAULT_BATCH_SIZE, DEFAULT_CRS_CODE,
    DEFAULT_TERRAIN_API_URL,
};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Server ---
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// GCP project ID. Trips are kept in memory when unset.
    pub gcp_project_id: Option<String>,

    // --- Terrain provider ---
    /// Point elevation endpoint
    pub terrain_api_url: String,
    /// EPSG code sent with every lookup
    pub terrain_crs: u32,
    /// Per-request timeout
    pub terrain_timeout: Duration,

    // --- Elevation pipeline ---
    pub sample_interval_meters: f64,
    pub batch_size: usize,
    pub batch_pause: Duration,
    pub max_sample_points: usize,
}

impl Config {
    /// Config for tests: in-memory storage and no pause between lookup windows.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            gcp_project_id: None,
            terrain_api_url: "http://127.0.0.1:9/punkt".to_string(),
            terrain_crs: DEFAULT_CRS_CODE,
            terrain_timeout: Duration::from_secs(2),
            sample_interval_meters: DEFAULT_SAMPLE_INTERVAL_METERS,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pause: Duration::ZERO,
            max_sample_points: DEFAULT_MAX_SAMPLE_POINTS,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let batch_size: usize = parse_var("ELEVATION_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(ConfigError::Invalid(
                "ELEVATION_BATCH_SIZE",
                "must be at least 1".to_string(),
            ));
        }

        let sample_interval_meters: f64 =
            parse_var("SAMPLE_INTERVAL_METERS", DEFAULT_SAMPLE_INTERVAL_METERS)?;
        if !sample_interval_meters.is_finite() || sample_interval_meters <= 0.0 {
            return Err(ConfigError::Invalid(
                "SAMPLE_INTERVAL_METERS",
                "must be a positive number".to_string(),
            ));
        }

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            terrain_api_url: env::var("TERRAIN_API_URL")
                .unwrap_or_else(|_| DEFAULT_TERRAIN_API_URL.to_string()),
            terrain_crs: parse_var("TERRAIN_CRS", DEFAULT_CRS_CODE)?,
            terrain_timeout: Duration::from_secs(parse_var("TERRAIN_TIMEOUT_SECS", 10)?),

            sample_interval_meters,
            batch_size,
            batch_pause: Duration::from_millis(parse_var(
                "ELEVATION_BATCH_PAUSE_MS",
                DEFAULT_BATCH_PAUSE.as_millis() as u64,
            )?),
            max_sample_points: parse_var("MAX_SAMPLE_POINTS", DEFAULT_MAX_SAMPLE_POINTS)?,
        })
    }

    /// Elevation pipeline settings derived from this config.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            interval_meters: self.sample_interval_meters,
            window: BatchWindow {
                size: self.batch_size,
                pause: self.batch_pause,
            },
            max_sample_points: self.max_sample_points,
        }
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid(name, e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
