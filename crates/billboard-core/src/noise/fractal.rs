//! Fractal (multi-octave) value noise.
//!
//! Octave `i` uses lattice resolution `floor(resolution × lacunarity^i)`,
//! amplitude `persistence^i` and its own random stream seeded with
//! `seed + seed_offset + 31·i`. The sum is normalised by total amplitude so the
//! output stays in `[0, 1)` for any octave count.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::value_noise;
use crate::grid::ScalarField;
use crate::params::OCTAVE_SEED_STRIDE;

#[cfg(feature = "threading")]
use rayon::prelude::*;

/// Layer description for [`fractal_noise`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalSpec {
    /// Base lattice resolution `(res_y, res_x)`.
    pub resolution: (usize, usize),
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    pub seed_offset: u64,
}

impl FractalSpec {
    pub const fn new(
        resolution: usize,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
        seed_offset: u64,
    ) -> Self {
        Self {
            resolution: (resolution, resolution),
            octaves,
            persistence,
            lacunarity,
            seed_offset,
        }
    }
}

/// Seed of octave `octave` of a layer with the given offset.
#[inline]
pub fn octave_seed(seed: u64, seed_offset: u64, octave: u32) -> u64 {
    seed.wrapping_add(seed_offset)
        .wrapping_add(octave as u64 * OCTAVE_SEED_STRIDE)
}

struct Octave {
    index: u32,
    resolution: (usize, usize),
    amplitude: f64,
}

/// Sum `spec.octaves` independently seeded value-noise layers.
pub fn fractal_noise(width: usize, height: usize, seed: u64, spec: &FractalSpec) -> ScalarField {
    // Frequency and amplitude accumulate multiplicatively, octave by octave.
    let mut plan = Vec::with_capacity(spec.octaves as usize);
    let mut amplitude = 1.0f64;
    let mut frequency = 1.0f64;
    for index in 0..spec.octaves {
        let scaled = |res: usize| ((res as f64 * frequency) as usize).max(1);
        plan.push(Octave {
            index,
            resolution: (scaled(spec.resolution.0), scaled(spec.resolution.1)),
            amplitude,
        });
        amplitude *= spec.persistence;
        frequency *= spec.lacunarity;
    }

    let layer = |o: &Octave| {
        let mut rng = StdRng::seed_from_u64(octave_seed(seed, spec.seed_offset, o.index));
        value_noise(width, height, o.resolution, &mut rng)
    };

    #[cfg(feature = "threading")]
    let layers: Vec<ScalarField> = plan.par_iter().map(layer).collect();
    #[cfg(not(feature = "threading"))]
    let layers: Vec<ScalarField> = plan.iter().map(layer).collect();

    // Summed in octave order regardless of how the layers were produced.
    let mut sum = vec![0.0f32; width * height];
    let mut total_amplitude = 0.0f64;
    for (o, field) in plan.iter().zip(layers.iter()) {
        let amp = o.amplitude as f32;
        for (s, &v) in sum.iter_mut().zip(field.data.iter()) {
            *s += v * amp;
        }
        total_amplitude += o.amplitude;
    }
    if total_amplitude > 0.0 {
        let norm = total_amplitude as f32;
        for s in &mut sum {
            *s /= norm;
        }
    }

    ScalarField { data: sum, width, height }
}
