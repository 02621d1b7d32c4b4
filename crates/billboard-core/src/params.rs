use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Seed offsets ──────────────────────────────────────────────────────────────
//
// Every noise layer is seeded with `seed + offset + octave * OCTAVE_SEED_STRIDE`.
// Changing any of these changes all output for a fixed seed.

pub const SEED_OFFSET_CONTINENTS: u64 = 0;
pub const SEED_OFFSET_MOUNTAINS: u64 = 57;
pub const SEED_OFFSET_RIDGES: u64 = 113;
pub const SEED_OFFSET_MOISTURE: u64 = 201;
pub const SEED_OFFSET_MOISTURE_DETAIL: u64 = 301;
pub const SEED_OFFSET_TEMPERATURE: u64 = 419;
pub const SEED_OFFSET_CITY_DENSITY: u64 = 1001;
pub const SEED_OFFSET_RIVER_INFLUENCE: u64 = 1107;
pub const OCTAVE_SEED_STRIDE: u64 = 31;

/// Elevation at or below which a pixel is ocean.
pub const SEA_LEVEL: f32 = 0.0;

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("width and height must be positive integers (got {width}×{height})")]
    ZeroDimension { width: usize, height: usize },
    #[error("invalid params JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Inputs of one generation run. Missing JSON keys fall back to [`Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    pub seed: u64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            seed: 42,
        }
    }
}

impl GenerationParams {
    /// Reject dimensions the pipeline cannot render into.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.width == 0 || self.height == 0 {
            return Err(ParamsError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Parse and validate a params JSON document.
    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }
}
