//! Pipeline orchestrator: runs all generation stages in order.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::climate::simulate_climate;
use crate::grid::{Mask, ScalarField};
use crate::hydrology::trace_rivers;
use crate::params::{GenerationParams, SEA_LEVEL};
use crate::settlements::estimate_settlements;
use crate::shading::{shade, RgbBuffer};
use crate::terrain::{synthesize_elevation, DiscGeometry};

// ── Public structs ────────────────────────────────────────────────────────────

/// Every intermediate field of one generation run.
///
/// All grids share the same `width × height` shape. Produced once by
/// [`generate_maps`] and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetMaps {
    /// Roughly `[-1.3, 1.1]`; sea level is 0.
    pub elevation: ScalarField,
    pub moisture: ScalarField,
    pub temperature: ScalarField,
    /// River intensity in `[0, 1]`.
    pub rivers: ScalarField,
    /// City-light intensity in `[0, 1]`.
    pub cities: ScalarField,
    /// On-disc pixels.
    pub mask: Mask,
    /// Distance of each pixel from the disc centre.
    pub distance: ScalarField,
    pub radius: f32,
}

impl PlanetMaps {
    pub fn width(&self) -> usize {
        self.elevation.width
    }

    pub fn height(&self) -> usize {
        self.elevation.height
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Generate every field for a `width × height` image.
///
/// Pipeline order:
///   1. Disc geometry (distance, mask, radius)
///   2. Elevation
///   3. Climate (moisture, temperature)
///   4. Rivers, using the run's random stream seeded from `seed`
///   5. City lights
///
/// Deterministic: identical arguments give bit-identical maps. Zero dimensions
/// give empty fields rather than a panic.
pub fn generate_maps(width: usize, height: usize, seed: u64) -> PlanetMaps {
    let _span = info_span!("generate_maps", width, height, seed).entered();

    // ── 1. Disc geometry ────────────────────────────────────────────────────
    let geometry = DiscGeometry::new(width, height);
    if width == 0 || height == 0 {
        let empty = ScalarField::new(width, height, 0.0);
        return PlanetMaps {
            elevation: empty.clone(),
            moisture: empty.clone(),
            temperature: empty.clone(),
            rivers: empty.clone(),
            cities: empty,
            mask: geometry.mask,
            distance: geometry.distance,
            radius: geometry.radius,
        };
    }

    // ── 2. Elevation ────────────────────────────────────────────────────────
    let elevation = synthesize_elevation(&geometry, seed);

    // ── 3. Climate ──────────────────────────────────────────────────────────
    let climate = simulate_climate(&geometry, &elevation, seed);

    // ── 4. Rivers ───────────────────────────────────────────────────────────
    let mut rng = StdRng::seed_from_u64(seed);
    let rivers = trace_rivers(&elevation, &climate.moisture, &geometry.mask, SEA_LEVEL, &mut rng);

    // ── 5. City lights ──────────────────────────────────────────────────────
    let cities = estimate_settlements(
        &elevation,
        &climate.moisture,
        &climate.temperature,
        &geometry.mask,
        SEA_LEVEL,
        seed,
    );
    debug!(disc_pixels = geometry.mask.count(), radius = geometry.radius, "maps generated");

    PlanetMaps {
        elevation,
        moisture: climate.moisture,
        temperature: climate.temperature,
        rivers,
        cities,
        mask: geometry.mask,
        distance: geometry.distance,
        radius: geometry.radius,
    }
}

/// Shade `maps` into an 8-bit RGB buffer. Pure function of its input.
pub fn render(maps: &PlanetMaps) -> RgbBuffer {
    let _span = info_span!("render", width = maps.width(), height = maps.height()).entered();
    shade(maps)
}

/// [`generate_maps`] followed by [`render`].
pub fn generate(width: usize, height: usize, seed: u64) -> RgbBuffer {
    render(&generate_maps(width, height, seed))
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Generator bound to one set of [`GenerationParams`].
#[derive(Debug, Clone)]
pub struct PlanetGenerator {
    params: GenerationParams,
}

impl PlanetGenerator {
    pub fn new(params: GenerationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn generate_maps(&self) -> PlanetMaps {
        generate_maps(self.params.width, self.params.height, self.params.seed)
    }

    pub fn generate(&self) -> RgbBuffer {
        render(&self.generate_maps())
    }
}

impl Default for PlanetGenerator {
    fn default() -> Self {
        Self::new(GenerationParams::default())
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shading::space_pixel;
    use crate::terrain::disc_radius;

    fn all_fields(m: &PlanetMaps) -> [&ScalarField; 6] {
        [&m.elevation, &m.moisture, &m.temperature, &m.rivers, &m.cities, &m.distance]
    }

    #[test]
    fn maps_are_deterministic() {
        let a = generate_maps(48, 40, 1234);
        let b = generate_maps(48, 40, 1234);
        assert_eq!(a, b);
    }

    #[test]
    fn seed_changes_maps() {
        let a = generate_maps(48, 48, 1);
        let b = generate_maps(48, 48, 2);
        assert_ne!(a.elevation, b.elevation);
    }

    #[test]
    fn every_field_has_the_image_shape() {
        let m = generate_maps(50, 30, 7);
        for f in all_fields(&m) {
            assert_eq!((f.width, f.height, f.data.len()), (50, 30, 1500));
        }
        assert_eq!((m.mask.width, m.mask.height, m.mask.data.len()), (50, 30, 1500));
        let img = render(&m);
        assert_eq!((img.width, img.height, img.data.len()), (50, 30, 1500 * 3));
    }

    #[test]
    fn field_ranges_hold_across_seeds() {
        for seed in [0u64, 1, 42, 999, u64::MAX] {
            let m = generate_maps(40, 40, seed);
            for f in [&m.moisture, &m.temperature, &m.rivers, &m.cities] {
                assert!(f.data.iter().all(|&v| (0.0..=1.0).contains(&v)), "seed {seed}: unit range violated");
            }
            assert!(
                m.elevation.data.iter().all(|&v| (-1.3..=1.1).contains(&v)),
                "seed {seed}: elevation out of range"
            );
        }
    }

    #[test]
    fn mask_agrees_with_distance_and_radius() {
        let m = generate_maps(60, 44, 3);
        assert_eq!(m.radius, disc_radius(60, 44));
        assert!((m.radius - 44.0 * 0.95 / 2.0).abs() < 1e-5);
        for i in 0..m.mask.len() {
            assert_eq!(m.mask.data[i], m.distance.data[i] <= m.radius);
        }
    }

    #[test]
    fn lights_and_rivers_stay_on_the_disc() {
        let m = generate_maps(64, 64, 42);
        for i in 0..m.mask.len() {
            if !m.mask.data[i] {
                assert_eq!(m.cities.data[i], 0.0);
            }
        }
    }

    #[test]
    fn render_is_pure() {
        let m = generate_maps(32, 32, 5);
        assert_eq!(render(&m), render(&m));
    }

    /// 64×64, seed 42: right shape, something besides space, reproducible.
    #[test]
    fn generate_64_seed42_end_to_end() {
        let img = generate(64, 64, 42);
        assert_eq!(img.data.len(), 64 * 64 * 3);
        let space = space_pixel();
        let differs = (0..64).any(|r| (0..64).any(|c| img.pixel(r, c) != space));
        assert!(differs, "image should contain more than deep space");
        assert_eq!(img, generate(64, 64, 42));
    }

    #[cfg(feature = "threading")]
    #[test]
    fn thread_count_does_not_change_output() {
        let run = |threads: usize| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap()
                .install(|| generate(48, 48, 7))
        };
        assert_eq!(run(1), run(4));
    }

    #[test]
    fn generator_wraps_free_functions() {
        let params = GenerationParams { width: 20, height: 16, seed: 9 };
        let gen = PlanetGenerator::new(params);
        assert_eq!(gen.generate(), generate(20, 16, 9));
    }

    #[test]
    fn zero_dimensions_give_empty_output() {
        let m = generate_maps(0, 10, 1);
        assert!(m.elevation.is_empty() && m.mask.is_empty());
        assert!(render(&m).data.is_empty());
    }
}
