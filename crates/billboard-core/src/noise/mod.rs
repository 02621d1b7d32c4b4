//! Seeded value noise over a coarse random lattice.
//!
//! The lattice is sampled once per call from the caller's random stream and
//! interpolated with the quintic fade curve. Lattice indices clamp at the last
//! row/column, so the noise does not tile.

pub mod fractal;

use crate::grid::ScalarField;
use ::noise::NoiseFn;
use rand::Rng;

#[cfg(feature = "threading")]
use rayon::prelude::*;

pub use fractal::{fractal_noise, octave_seed, FractalSpec};

/// Quintic fade curve `t³(6t² − 15t + 10)`.
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// A `(res_y + 1) × (res_x + 1)` grid of independent uniform samples in `[0, 1)`.
///
/// Evaluated through [`NoiseFn`] at lattice-space coordinates `[x, y]` with
/// `x ∈ [0, res_x]`, `y ∈ [0, res_y]`.
#[derive(Debug, Clone)]
pub struct ValueLattice {
    values: Vec<f32>,
    res_x: usize,
    res_y: usize,
}

impl ValueLattice {
    /// Draw a fresh lattice from `rng`, row-major. Resolutions below 1 are raised to 1.
    pub fn sample<R: Rng + ?Sized>(res_y: usize, res_x: usize, rng: &mut R) -> Self {
        let res_y = res_y.max(1);
        let res_x = res_x.max(1);
        let values = (0..(res_y + 1) * (res_x + 1)).map(|_| rng.gen::<f32>()).collect();
        Self { values, res_x, res_y }
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.res_y, self.res_x)
    }

    #[inline]
    fn node(&self, y: usize, x: usize) -> f64 {
        self.values[y * (self.res_x + 1) + x] as f64
    }
}

impl NoiseFn<f64, 2> for ValueLattice {
    fn get(&self, point: [f64; 2]) -> f64 {
        let x = point[0].clamp(0.0, self.res_x as f64);
        let y = point[1].clamp(0.0, self.res_y as f64);

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.res_x);
        let y1 = (y0 + 1).min(self.res_y);

        let sx = fade(x - x0 as f64);
        let sy = fade(y - y0 as f64);

        let n0 = self.node(y0, x0) * (1.0 - sx) + self.node(y0, x1) * sx;
        let n1 = self.node(y1, x0) * (1.0 - sx) + self.node(y1, x1) * sx;
        n0 * (1.0 - sy) + n1 * sy
    }
}

/// Generate a `width × height` value-noise field with `resolution = (res_y, res_x)`
/// lattice cells.
///
/// Pixel `(r, c)` maps to lattice coordinates `(r · res_y / height, c · res_x / width)`,
/// so the last lattice row/column is approached but never reached exactly.
/// Values lie in `[0, 1)`.
pub fn value_noise<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    resolution: (usize, usize),
    rng: &mut R,
) -> ScalarField {
    let lattice = ValueLattice::sample(resolution.0, resolution.1, rng);
    if width == 0 || height == 0 {
        return ScalarField::new(width, height, 0.0);
    }
    let (res_y, res_x) = lattice.resolution();

    let step_x = res_x as f64 / width as f64;
    let step_y = res_y as f64 / height as f64;
    let xs: Vec<f64> = (0..width).map(|c| c as f64 * step_x).collect();

    let fill_row = |r: usize, row: &mut [f32]| {
        let y = r as f64 * step_y;
        for (v, &x) in row.iter_mut().zip(xs.iter()) {
            *v = lattice.get([x, y]) as f32;
        }
    };

    let mut data = vec![0.0f32; width * height];
    #[cfg(feature = "threading")]
    data.par_chunks_mut(width)
        .enumerate()
        .for_each(|(r, row)| fill_row(r, row));
    #[cfg(not(feature = "threading"))]
    data.chunks_mut(width)
        .enumerate()
        .for_each(|(r, row)| fill_row(r, row));

    ScalarField { data, width, height }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fade_fixes_endpoints_and_midpoint() {
        assert_abs_diff_eq!(fade(0.0), 0.0);
        assert_abs_diff_eq!(fade(1.0), 1.0);
        assert_abs_diff_eq!(fade(0.5), 0.5, epsilon = 1e-12);
        // Flat at both ends.
        assert!(fade(0.01) < 0.01 && fade(0.99) > 0.99);
    }

    #[test]
    fn lattice_nodes_are_reproduced_exactly() {
        let mut rng = StdRng::seed_from_u64(3);
        let lattice = ValueLattice::sample(2, 3, &mut rng);
        for y in 0..=2 {
            for x in 0..=3 {
                let v = lattice.get([x as f64, y as f64]);
                assert_abs_diff_eq!(v, lattice.node(y, x), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn lattice_clamps_instead_of_wrapping() {
        let mut rng = StdRng::seed_from_u64(9);
        let lattice = ValueLattice::sample(1, 1, &mut rng);
        let far = lattice.get([5.0, 5.0]);
        assert_abs_diff_eq!(far, lattice.node(1, 1), epsilon = 1e-12);
        let neg = lattice.get([-2.0, -2.0]);
        assert_abs_diff_eq!(neg, lattice.node(0, 0), epsilon = 1e-12);
    }

    #[test]
    fn zero_resolution_is_raised_to_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let lattice = ValueLattice::sample(0, 0, &mut rng);
        assert_eq!(lattice.resolution(), (1, 1));
    }

    #[test]
    fn value_noise_in_unit_range_and_shaped() {
        let mut rng = StdRng::seed_from_u64(42);
        let f = value_noise(37, 23, (4, 6), &mut rng);
        assert_eq!((f.width, f.height, f.data.len()), (37, 23, 37 * 23));
        assert!(f.data.iter().all(|&v| (0.0..1.0).contains(&v)));
        assert!(f.max_value() - f.min_value() > 0.05, "noise should not be flat");
    }

    #[test]
    fn value_noise_first_pixel_is_first_lattice_node() {
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);
        let f = value_noise(16, 16, (4, 4), &mut a);
        let first: f32 = b.gen();
        assert_abs_diff_eq!(f.get(0, 0), first, epsilon = 1e-6);
    }

    #[test]
    fn value_noise_is_deterministic_per_stream() {
        let f1 = value_noise(32, 32, (5, 5), &mut StdRng::seed_from_u64(7));
        let f2 = value_noise(32, 32, (5, 5), &mut StdRng::seed_from_u64(7));
        let f3 = value_noise(32, 32, (5, 5), &mut StdRng::seed_from_u64(8));
        assert_eq!(f1, f2);
        assert_ne!(f1, f3);
    }
}
