//! Climate layer: moisture and temperature fields.
//!
//! Pipeline:
//!   moisture    = broad noise + detail noise + lowland wetness
//!   temperature = latitude base − altitude cooling + regional noise
//!
//! Both read only elevation and disc geometry; rivers and cities are
//! computed downstream of this layer.

pub mod latitude_bands;

use tracing::debug;

use crate::grid::ScalarField;
use crate::noise::{fractal_noise, FractalSpec};
use crate::params::{SEED_OFFSET_MOISTURE, SEED_OFFSET_MOISTURE_DETAIL, SEED_OFFSET_TEMPERATURE};
use crate::terrain::DiscGeometry;
use latitude_bands::temperature_base;

const MOISTURE_BASE: FractalSpec = FractalSpec::new(6, 5, 0.58, 2.05, SEED_OFFSET_MOISTURE);
const MOISTURE_DETAIL: FractalSpec = FractalSpec::new(18, 3, 0.6, 2.2, SEED_OFFSET_MOISTURE_DETAIL);
const TEMPERATURE_NOISE: FractalSpec = FractalSpec::new(10, 4, 0.52, 2.05, SEED_OFFSET_TEMPERATURE);

const MOISTURE_DETAIL_WEIGHT: f32 = 0.3;
/// Extra wetness per unit of depth below sea level (depth capped at 1).
const LOWLAND_WETNESS: f32 = 0.15;
/// Cooling per unit of elevation above sea level.
const ALTITUDE_COOLING: f32 = 0.55;
const TEMPERATURE_NOISE_WEIGHT: f32 = 0.25;

/// All outputs of the climate layer.
pub struct ClimateLayer {
    /// Moisture in `[0, 1]`, row-major.
    pub moisture: ScalarField,
    /// Temperature in `[0, 1]`, row-major.
    pub temperature: ScalarField,
}

/// Run the full climate layer.
///
/// `elevation` must match the geometry's grid dimensions.
pub fn simulate_climate(geometry: &DiscGeometry, elevation: &ScalarField, seed: u64) -> ClimateLayer {
    let moisture = synthesize_moisture(elevation, seed);
    let temperature = synthesize_temperature(geometry, elevation, seed);
    debug!(
        moisture_mean = moisture.mean(),
        temperature_mean = temperature.mean(),
        "climate synthesised"
    );
    ClimateLayer { moisture, temperature }
}

/// Moisture: lower ground is wetter. Clipped to `[0, 1]`.
pub fn synthesize_moisture(elevation: &ScalarField, seed: u64) -> ScalarField {
    let (w, h) = (elevation.width, elevation.height);
    let mut moisture = fractal_noise(w, h, seed, &MOISTURE_BASE);
    let detail = fractal_noise(w, h, seed, &MOISTURE_DETAIL);

    for ((m, &d), &e) in moisture
        .data
        .iter_mut()
        .zip(detail.data.iter())
        .zip(elevation.data.iter())
    {
        *m += (d - 0.5) * MOISTURE_DETAIL_WEIGHT;
        *m += (-e).clamp(0.0, 1.0) * LOWLAND_WETNESS;
    }
    moisture.clip(0.0, 1.0);
    moisture
}

/// Temperature: latitude banding cooled by altitude. Clipped to `[0, 1]`.
pub fn synthesize_temperature(geometry: &DiscGeometry, elevation: &ScalarField, seed: u64) -> ScalarField {
    let (w, h) = (elevation.width, elevation.height);
    let noise = fractal_noise(w, h, seed, &TEMPERATURE_NOISE);

    let mut temperature = ScalarField::from_fn(w, h, |r, c| {
        let i = r * w + c;
        temperature_base(geometry.latitude(r))
            - elevation.data[i].max(0.0) * ALTITUDE_COOLING
            + (noise.data[i] - 0.5) * TEMPERATURE_NOISE_WEIGHT
    });
    temperature.clip(0.0, 1.0);
    temperature
}
