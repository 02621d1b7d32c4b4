//! River tracing: greedy downhill walks from wet highland sources.
//!
//! Each walk starts at a shuffled source pixel and repeatedly steps to the
//! 8-connected neighbour with the lowest `elevation − 0.015·moisture`, adding
//! one unit of intensity per pixel visited. The summed intensity is normalised
//! and blurred into soft river strands.
//!
//! Walks only read the static fields, so they are independent: with the
//! `threading` feature they run in parallel and their paths are accumulated
//! afterwards in source order.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::grid::{Mask, ScalarField};

#[cfg(feature = "threading")]
use rayon::prelude::*;

/// 8-neighbourhood offsets `(dr, dc)`, scanned in this order.
const D8_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    ( 0, -1),          ( 0, 1),
    ( 1, -1), ( 1, 0), ( 1, 1),
];

const SOURCE_ELEVATION_MARGIN: f32 = 0.05;
const SOURCE_MIN_MOISTURE: f32 = 0.45;
const MIN_SOURCES: usize = 6;
const PIXELS_PER_SOURCE: usize = 22_000;
const MAX_WALK_STEPS: usize = 800;
/// Moisture bias on the descent score; wetter cells attract flow.
const MOISTURE_PULL: f32 = 0.015;
/// A step must beat the current best by more than this.
const MIN_IMPROVEMENT: f32 = 1e-4;

const BLUR_PASSES: usize = 2;
const BLUR_NEIGHBOR_WEIGHT: f32 = 0.35;
const BLUR_DENOMINATOR: f32 = 2.4;

/// Number of walks for an image of `pixel_count` pixels.
pub fn source_budget(pixel_count: usize) -> usize {
    MIN_SOURCES.max(pixel_count / PIXELS_PER_SOURCE)
}

/// Row-major indices of on-disc pixels that are high and wet enough to seed a river.
pub fn river_sources(
    elevation: &ScalarField,
    moisture: &ScalarField,
    mask: &Mask,
    sea_level: f32,
) -> Vec<usize> {
    (0..elevation.len())
        .filter(|&i| {
            mask.data[i]
                && elevation.data[i] > sea_level + SOURCE_ELEVATION_MARGIN
                && moisture.data[i] > SOURCE_MIN_MOISTURE
        })
        .collect()
}

/// Follow one greedy descent from `start`; returns the visited pixels in order.
///
/// The walk ends on reaching sea level, a local minimum or flat (no neighbour
/// improves by more than `MIN_IMPROVEMENT`), a revisited pixel, or after
/// `MAX_WALK_STEPS` steps.
pub fn trace_walk(
    start: usize,
    elevation: &ScalarField,
    moisture: &ScalarField,
    mask: &Mask,
    sea_level: f32,
) -> Vec<usize> {
    let rows = elevation.height as isize;
    let cols = elevation.width as isize;
    let mut path = Vec::new();
    let mut visited = HashSet::new();
    let mut current = start;

    for _ in 0..MAX_WALK_STEPS {
        if !visited.insert(current) {
            break;
        }
        path.push(current);
        if elevation.data[current] <= sea_level {
            break;
        }

        let r = (current / elevation.width) as isize;
        let c = (current % elevation.width) as isize;
        let mut best: Option<usize> = None;
        let mut best_score = elevation.data[current];
        for &(dr, dc) in &D8_OFFSETS {
            let nr = r + dr;
            let nc = c + dc;
            if nr < 0 || nc < 0 || nr >= rows || nc >= cols {
                continue;
            }
            let n = nr as usize * elevation.width + nc as usize;
            if !mask.data[n] {
                continue;
            }
            let score = elevation.data[n] - MOISTURE_PULL * moisture.data[n];
            if score < best_score - MIN_IMPROVEMENT {
                best_score = score;
                best = Some(n);
            }
        }

        match best {
            Some(n) => current = n,
            None => break,
        }
    }
    path
}

/// One pass of `(m + 0.35·(N + S + E + W)) / 2.4`, wrapping at the borders.
fn blur_pass(field: &ScalarField) -> ScalarField {
    let (w, h) = (field.width, field.height);
    ScalarField::from_fn(w, h, |r, c| {
        let up = field.get((r + h - 1) % h, c);
        let down = field.get((r + 1) % h, c);
        let left = field.get(r, (c + w - 1) % w);
        let right = field.get(r, (c + 1) % w);
        (field.get(r, c) + BLUR_NEIGHBOR_WEIGHT * (up + down + left + right)) / BLUR_DENOMINATOR
    })
}

/// Derive the river intensity field in `[0, 1]`.
///
/// `rng` shuffles the candidate sources; it is the pipeline's single random
/// stream and is advanced by exactly one shuffle. Returns an all-zero field when
/// no pixel qualifies as a source.
pub fn trace_rivers<R: Rng + ?Sized>(
    elevation: &ScalarField,
    moisture: &ScalarField,
    mask: &Mask,
    sea_level: f32,
    rng: &mut R,
) -> ScalarField {
    let mut rivers = ScalarField::new(elevation.width, elevation.height, 0.0);

    let mut candidates = river_sources(elevation, moisture, mask, sea_level);
    if candidates.is_empty() {
        debug!("no river sources");
        return rivers;
    }
    candidates.shuffle(rng);
    candidates.truncate(source_budget(elevation.len()));

    let walk = |&start: &usize| trace_walk(start, elevation, moisture, mask, sea_level);
    #[cfg(feature = "threading")]
    let paths: Vec<Vec<usize>> = candidates.par_iter().map(walk).collect();
    #[cfg(not(feature = "threading"))]
    let paths: Vec<Vec<usize>> = candidates.iter().map(walk).collect();

    for path in &paths {
        for &i in path {
            rivers.data[i] += 1.0;
        }
    }

    let peak = rivers.max_value();
    debug!(sources = candidates.len(), peak, "rivers traced");
    if peak > 0.0 {
        for v in &mut rivers.data {
            *v /= peak;
        }
        for _ in 0..BLUR_PASSES {
            rivers = blur_pass(&rivers);
        }
    }
    rivers.clip(0.0, 1.0);
    rivers
}
