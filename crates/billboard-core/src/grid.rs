use serde::{Deserialize, Serialize};

/// A dense 2D grid with one cell per output pixel, row-major.
///
/// Every field of a generation run shares the same `width × height` shape;
/// the elementwise helpers below assume (and debug-assert) that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    /// Row-major cell values, length `width * height`.
    pub data: Vec<T>,
    pub width: usize,
    pub height: usize,
}

/// Real-valued field (elevation, moisture, temperature, rivers, cities, distance).
pub type ScalarField = Grid<f32>;

/// Boolean field; `true` marks pixels on the planet disc.
pub type Mask = Grid<bool>;

/// Per-pixel unit surface normals `(x, y, z)`.
pub type NormalField = Grid<[f32; 3]>;

impl<T: Copy> Grid<T> {
    /// Create a grid filled with the given value.
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
        }
    }

    /// Build a grid by evaluating `f(row, col)` for every cell in row-major order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for r in 0..height {
            for c in 0..width {
                data.push(f(r, c));
            }
        }
        Self { data, width, height }
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: T) {
        self.data[row * self.width + col] = val;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Elementwise transform into a new grid of the same shape.
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Grid<U> {
        Grid {
            data: self.data.iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Elementwise combination of two same-shaped grids.
    pub fn zip_map<U: Copy, V: Copy>(&self, other: &Grid<U>, f: impl Fn(T, U) -> V) -> Grid<V> {
        debug_assert!(self.same_shape(other), "zip_map on mismatched grid shapes");
        Grid {
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Overwrite every cell where `mask` is set with `value`.
    pub fn fill_where(&mut self, mask: &Mask, value: T) {
        debug_assert!(self.same_shape(mask), "fill_where on mismatched grid shapes");
        for (v, &m) in self.data.iter_mut().zip(mask.data.iter()) {
            if m {
                *v = value;
            }
        }
    }

    /// Overwrite every cell where `mask` is set with the matching cell of `source`.
    pub fn copy_where(&mut self, mask: &Mask, source: &Grid<T>) {
        debug_assert!(self.same_shape(mask) && self.same_shape(source));
        for ((v, &m), &s) in self.data.iter_mut().zip(mask.data.iter()).zip(source.data.iter()) {
            if m {
                *v = s;
            }
        }
    }
}

impl Grid<f32> {
    pub fn min_value(&self) -> f32 {
        self.data.iter().cloned().fold(f32::INFINITY, f32::min)
    }

    pub fn max_value(&self) -> f32 {
        self.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Arithmetic mean, accumulated in f64. NaN for an empty grid.
    pub fn mean(&self) -> f64 {
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        sum / self.data.len() as f64
    }

    /// Population standard deviation (divides by `n`, not `n − 1`).
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let var: f64 = self
            .data
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / self.data.len() as f64;
        var.sqrt()
    }

    /// Clamp every cell into `[lo, hi]`.
    pub fn clip(&mut self, lo: f32, hi: f32) {
        for v in &mut self.data {
            *v = v.clamp(lo, hi);
        }
    }
}

impl Grid<bool> {
    /// Number of set cells.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&m| m).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn from_fn_is_row_major() {
        let g = Grid::from_fn(3, 2, |r, c| (r * 10 + c) as f32);
        assert_eq!(g.data, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(g.get(1, 2), 12.0);
        assert_eq!(g.index(1, 0), 3);
    }

    #[test]
    fn population_std_dev() {
        let g = Grid { data: vec![2.0f32, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], width: 4, height: 2 };
        assert_abs_diff_eq!(g.mean(), 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(g.std_dev(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn fill_where_only_touches_masked_cells() {
        let mut g = Grid::new(2, 2, 0u8);
        let mask = Grid { data: vec![true, false, false, true], width: 2, height: 2 };
        g.fill_where(&mask, 7);
        assert_eq!(g.data, vec![7, 0, 0, 7]);
    }

    #[test]
    fn copy_where_takes_source_values() {
        let mut g = Grid::new(2, 1, 0.0f32);
        let src = Grid { data: vec![1.0f32, 2.0], width: 2, height: 1 };
        let mask = Grid { data: vec![false, true], width: 2, height: 1 };
        g.copy_where(&mask, &src);
        assert_eq!(g.data, vec![0.0, 2.0]);
    }

    #[test]
    fn clip_bounds_values() {
        let mut g = Grid { data: vec![-2.0f32, 0.5, 3.0], width: 3, height: 1 };
        g.clip(0.0, 1.0);
        assert_eq!(g.data, vec![0.0, 0.5, 1.0]);
        assert_eq!(g.min_value(), 0.0);
        assert_eq!(g.max_value(), 1.0);
    }

    #[test]
    fn zip_map_combines_cellwise() {
        let a = Grid::from_fn(2, 2, |r, c| (r + c) as f32);
        let b = Grid::new(2, 2, true);
        let z = a.zip_map(&b, |v, m| if m { v * 2.0 } else { v });
        assert_eq!(z.data, vec![0.0, 2.0, 2.0, 4.0]);
    }
}
