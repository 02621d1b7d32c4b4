//! Disc geometry and elevation synthesis.
//!
//! Elevation is three fractal layers (continents, mountain ranges, ridge
//! turbulence) standardised, scaled down, then pulled toward a deep-ocean bias
//! by a radial falloff so the disc edge reads as open sea.

use tracing::debug;

use crate::grid::{Mask, ScalarField};
use crate::noise::{fractal_noise, FractalSpec};
use crate::params::{SEED_OFFSET_CONTINENTS, SEED_OFFSET_MOUNTAINS, SEED_OFFSET_RIDGES};

/// Disc radius as a fraction of the half-extent of the shorter image side.
const RADIUS_FRACTION: f32 = 0.95;

const CONTINENTS: FractalSpec = FractalSpec::new(4, 6, 0.5, 2.1, SEED_OFFSET_CONTINENTS);
const MOUNTAINS: FractalSpec = FractalSpec::new(8, 5, 0.5, 2.0, SEED_OFFSET_MOUNTAINS);
const RIDGES: FractalSpec = FractalSpec::new(24, 4, 0.45, 2.0, SEED_OFFSET_RIDGES);

const CONTINENT_WEIGHT: f32 = 0.55;
const MOUNTAIN_WEIGHT: f32 = 0.35;
const RIDGE_WEIGHT: f32 = 0.25;
/// Post-standardisation relief scale.
const RELIEF_SCALE: f32 = 0.45;
/// Elevation that fully fallen-off pixels are pulled toward (negated).
const DEEP_OCEAN_BIAS: f32 = 0.65;
const FALLOFF_EXPONENT: i32 = 6;

pub const ELEVATION_MIN: f32 = -1.3;
pub const ELEVATION_MAX: f32 = 1.1;

/// Radius of the planet disc for a `width × height` image.
pub fn disc_radius(width: usize, height: usize) -> f32 {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    cx.min(cy) * RADIUS_FRACTION
}

/// Disc centre, radius, per-pixel distance and the derived on-disc mask.
#[derive(Debug, Clone)]
pub struct DiscGeometry {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    pub distance: ScalarField,
    pub mask: Mask,
}

impl DiscGeometry {
    pub fn new(width: usize, height: usize) -> Self {
        let center_x = width as f32 / 2.0;
        let center_y = height as f32 / 2.0;
        let radius = disc_radius(width, height);
        let distance = ScalarField::from_fn(width, height, |r, c| {
            let dx = c as f32 - center_x;
            let dy = r as f32 - center_y;
            (dx * dx + dy * dy).sqrt()
        });
        let mask = distance.map(|d| d <= radius);
        Self { center_x, center_y, radius, distance, mask }
    }

    /// Absolute latitude of row `r`, in disc radii from the equator.
    #[inline]
    pub fn latitude(&self, r: usize) -> f32 {
        ((r as f32 - self.center_y) / self.radius).abs()
    }
}

/// `clip(1 − (d/r)^6, 0, 1)`: 1 at the centre, 0 at and beyond the rim.
#[inline]
pub fn radial_falloff(distance: f32, radius: f32) -> f32 {
    (1.0 - (distance / radius).powi(FALLOFF_EXPONENT)).clamp(0.0, 1.0)
}

/// Fold a `[0, 1]` noise value into a sharp crest at 0.5.
#[inline]
fn ridge_peak(v: f32) -> f32 {
    1.0 - (v * 2.0 - 1.0).abs()
}

/// Build the elevation field, clipped to `[ELEVATION_MIN, ELEVATION_MAX]`.
pub fn synthesize_elevation(geometry: &DiscGeometry, seed: u64) -> ScalarField {
    let width = geometry.distance.width;
    let height = geometry.distance.height;

    let base = fractal_noise(width, height, seed, &CONTINENTS);
    let mountains = fractal_noise(width, height, seed, &MOUNTAINS);
    let ridges = fractal_noise(width, height, seed, &RIDGES);

    let mut elevation = base.zip_map(&mountains, |b, m| b * CONTINENT_WEIGHT + m * MOUNTAIN_WEIGHT);
    for (e, &r) in elevation.data.iter_mut().zip(ridges.data.iter()) {
        *e += ridge_peak(r) * RIDGE_WEIGHT;
    }

    // Standardise to zero mean, unit variance before shaping.
    let mean = elevation.mean() as f32;
    let std = elevation.std_dev() as f32;
    let denom = std + 1e-5;
    for (e, &d) in elevation.data.iter_mut().zip(geometry.distance.data.iter()) {
        let standardised = (*e - mean) / denom * RELIEF_SCALE;
        let falloff = radial_falloff(d, geometry.radius);
        *e = standardised * falloff - (1.0 - falloff) * DEEP_OCEAN_BIAS;
    }
    elevation.clip(ELEVATION_MIN, ELEVATION_MAX);

    debug!(
        min = elevation.min_value(),
        max = elevation.max_value(),
        "elevation synthesised"
    );
    elevation
}
