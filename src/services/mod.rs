// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - elevation pipeline.

pub mod distance;
pub mod elevation;
pub mod profile;
pub mod sampler;
pub mod terrain;

pub use elevation::{ElevationError, ElevationService, PipelineSettings};
pub use terrain::{BatchWindow, ElevationSource, TerrainClient, TerrainError};
