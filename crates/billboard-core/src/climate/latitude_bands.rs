//! Latitude-dependent temperature base.
//!
//! Produces a warm equatorial belt falling off toward the poles:
//!   - equator (latitude 0)   → 1.0
//!   - pole (latitude 1)      → 0.0
//!   - beyond the disc rim    → negative, clipped by the caller
//!
//! The exponent 1.55 widens the temperate band compared to a linear ramp.

const POLAR_EXPONENT: f32 = 1.55;

/// Temperature before altitude cooling and noise.
///
/// `latitude` is absolute distance from the equator row in disc radii.
pub fn temperature_base(latitude: f32) -> f32 {
    1.0 - latitude.abs().powf(POLAR_EXPONENT)
}
