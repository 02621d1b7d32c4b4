//! Surface normals from the elevation gradient.
//!
//! Gradients use central differences in the interior and one-sided
//! differences on the borders. Off-disc pixels get the flat, viewer-facing
//! normal so lighting never samples across the rim discontinuity.

use crate::grid::{Mask, NormalField, ScalarField};

/// Normal of a pixel facing the viewer.
pub const FLAT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// Discrete derivative at position `i` of a line of `n` samples.
#[inline]
fn axis_derivative(sample: impl Fn(usize) -> f32, i: usize, n: usize) -> f32 {
    if n < 2 {
        0.0
    } else if i == 0 {
        sample(1) - sample(0)
    } else if i == n - 1 {
        sample(n - 1) - sample(n - 2)
    } else {
        (sample(i + 1) - sample(i - 1)) * 0.5
    }
}

/// `(d/dx, d/dy)` of `field` in value units per pixel.
pub fn gradient(field: &ScalarField) -> (ScalarField, ScalarField) {
    let (w, h) = (field.width, field.height);
    let dx = ScalarField::from_fn(w, h, |r, c| axis_derivative(|k| field.get(r, k), c, w));
    let dy = ScalarField::from_fn(w, h, |r, c| axis_derivative(|k| field.get(k, c), r, h));
    (dx, dy)
}

/// Unit normals `(−dx, −dy, 1)/|·|`; off-mask pixels are exactly [`FLAT_NORMAL`].
pub fn compute_normals(elevation: &ScalarField, mask: &Mask) -> NormalField {
    let (dx, dy) = gradient(elevation);
    let mut normals = dx.zip_map(&dy, |gx, gy| {
        let len = (gx * gx + gy * gy + 1.0).sqrt().max(1e-6);
        [-gx / len, -gy / len, 1.0 / len]
    });
    for (n, &on_disc) in normals.data.iter_mut().zip(mask.data.iter()) {
        if !on_disc {
            *n = FLAT_NORMAL;
        }
    }
    normals
}
