//! City-light density from habitability bands and auxiliary noise.
//!
//! A pixel can host settlements only inside the habitability band (moderate
//! elevation, moisture and temperature). Density comes from a dedicated noise
//! layer, boosted near a second "river influence" layer that stands in for
//! waterway proximity, then sharpened so lights cluster instead of smearing.

use crate::grid::{Mask, ScalarField};
use crate::noise::{fractal_noise, FractalSpec};
use crate::params::{SEED_OFFSET_CITY_DENSITY, SEED_OFFSET_RIVER_INFLUENCE};

const DENSITY: FractalSpec = FractalSpec::new(14, 4, 0.55, 2.1, SEED_OFFSET_CITY_DENSITY);
const RIVER_INFLUENCE: FractalSpec = FractalSpec::new(28, 3, 0.5, 2.3, SEED_OFFSET_RIVER_INFLUENCE);

/// Habitable elevation band, relative to sea level at the bottom.
const MIN_COAST_MARGIN: f32 = 0.02;
const MAX_ELEVATION: f32 = 0.6;
/// Open bands for moisture and temperature.
const CLIMATE_BAND: (f32, f32) = (0.18, 0.85);

const DENSITY_THRESHOLD: f32 = 0.55;
const DENSITY_GAIN: f32 = 4.5;
const INFLUENCE_FLOOR: f32 = 0.4;
const BASE_WEIGHT: f32 = 0.65;
const INFLUENCE_WEIGHT: f32 = 0.35;
const CLUSTER_EXPONENT: f32 = 1.6;

/// True when the pixel lies inside every habitability band.
#[inline]
pub fn is_habitable(elevation: f32, moisture: f32, temperature: f32, sea_level: f32) -> bool {
    let (lo, hi) = CLIMATE_BAND;
    elevation > sea_level + MIN_COAST_MARGIN
        && elevation < MAX_ELEVATION
        && temperature > lo
        && temperature < hi
        && moisture > lo
        && moisture < hi
}

/// Combine a density sample and an influence sample into a light intensity.
#[inline]
fn city_intensity(density: f32, influence: f32) -> f32 {
    let base = ((density - DENSITY_THRESHOLD) * DENSITY_GAIN).clamp(0.0, 1.0);
    let boosted = base * (BASE_WEIGHT + INFLUENCE_WEIGHT * influence);
    boosted.powf(CLUSTER_EXPONENT).clamp(0.0, 1.0)
}

/// City-light intensity in `[0, 1]`; zero everywhere outside the habitability band.
pub fn estimate_settlements(
    elevation: &ScalarField,
    moisture: &ScalarField,
    temperature: &ScalarField,
    mask: &Mask,
    sea_level: f32,
    seed: u64,
) -> ScalarField {
    let (w, h) = (elevation.width, elevation.height);
    let density = fractal_noise(w, h, seed, &DENSITY);
    let influence = fractal_noise(w, h, seed, &RIVER_INFLUENCE)
        .map(|v| (v - INFLUENCE_FLOOR).clamp(0.0, 1.0));

    let data = (0..elevation.len())
        .map(|i| {
            let habitable = mask.data[i]
                && is_habitable(elevation.data[i], moisture.data[i], temperature.data[i], sea_level);
            if habitable {
                city_intensity(density.data[i], influence.data[i])
            } else {
                0.0
            }
        })
        .collect();

    ScalarField { data, width: w, height: h }
}
