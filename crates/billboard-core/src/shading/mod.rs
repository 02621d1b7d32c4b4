//! Compositor: turns [`PlanetMaps`] into an 8-bit RGB buffer.
//!
//! Stages, each a whole-field pass:
//!   1. Surface colour (ocean depth ramp or land biome)
//!   2. River overlay
//!   3. Day/night Lambert lighting with a faint night-side ambient
//!   4. Ocean specular, city glow on the night side, atmospheric tint
//!   5. Space background plus an outer limb glow just past the rim
//!   6. Quantisation to `u8`

pub mod palette;

use tracing::debug;

use crate::generator::PlanetMaps;
use crate::grid::{Grid, Mask};
use crate::normals::compute_normals;
use crate::params::SEA_LEVEL;
use palette::{classify_land, unit, Rgb, ATMOSPHERE, CITY_LIGHTS, DEEP_OCEAN, RIVER, SHALLOW_OCEAN, SPACE};

/// Per-pixel linear colour, channels nominally in `[0, 1]`.
pub type ColorField = Grid<Rgb>;

/// Light direction before normalisation; the sun sits upper right, in front.
const LIGHT_DIRECTION: [f32; 3] = [0.45, -0.3, 0.84];

/// Depth (below sea level) at which the ocean reaches the shallow colour.
const OCEAN_DEPTH_RANGE: f32 = 1.5;
const RIVER_MAX_BLEND: f32 = 0.75;
const AMBIENT: f32 = 0.35;
const DIFFUSE: f32 = 0.65;
const NIGHT_AMBIENT: f32 = 0.08;
const SPECULAR_EXPONENT: i32 = 8;
const SPECULAR_STRENGTH: f32 = 0.45;
const CITY_GLOW: f32 = 1.1;
/// Atmosphere band width as a fraction of the radius.
const ATMOSPHERE_WIDTH: f32 = 0.06;
const ATMOSPHERE_EXPONENT: f32 = 1.5;
const ATMOSPHERE_TINT: f32 = 0.18;
const LIMB_GLOW: f32 = 0.6;

/// Final image: `height × width × 3` bytes, row-major, interleaved RGB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbBuffer {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl RgbBuffer {
    /// Quantise a `[0, 1]` colour field; channels are clipped then truncated.
    pub fn from_color_field(field: &ColorField) -> Self {
        let data = field.data.iter().flat_map(|&c| quantize(c)).collect();
        Self { data, width: field.width, height: field.height }
    }

    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> [u8; 3] {
        let i = (row * self.width + col) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

#[inline]
fn quantize(c: Rgb) -> [u8; 3] {
    c.map(|v| (v.clamp(0.0, 1.0) * 255.0) as u8)
}

/// The background colour exactly as it appears in a rendered buffer.
pub fn space_pixel() -> [u8; 3] {
    quantize(unit(SPACE))
}

#[inline]
fn scale(c: Rgb, s: f32) -> Rgb {
    [c[0] * s, c[1] * s, c[2] * s]
}

#[inline]
fn add(a: Rgb, b: Rgb) -> Rgb {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t, a[2] + (b[2] - a[2]) * t]
}

/// Unit light vector.
pub fn light_direction() -> [f32; 3] {
    let [x, y, z] = LIGHT_DIRECTION;
    let len = (x * x + y * y + z * z).sqrt();
    [x / len, y / len, z / len]
}

/// `(day, night)` Lambert terms: the positive and negative parts of `n·L`.
#[inline]
pub fn light_terms(normal: [f32; 3], light: [f32; 3]) -> (f32, f32) {
    let l = (normal[0] * light[0] + normal[1] * light[1] + normal[2] * light[2]).clamp(-1.0, 1.0);
    (l.max(0.0), (-l).max(0.0))
}

/// Elevation at or below sea level reads as water.
#[inline]
pub fn is_ocean(elevation: f32) -> bool {
    elevation <= SEA_LEVEL
}

/// On-disc water pixels.
pub fn ocean_mask(maps: &PlanetMaps) -> Mask {
    maps.elevation.zip_map(&maps.mask, |e, on_disc| on_disc && is_ocean(e))
}

/// Ocean or biome colour for every on-disc pixel; off-disc pixels stay black.
fn surface_color(maps: &PlanetMaps, ocean: &Mask) -> ColorField {
    let deep = unit(DEEP_OCEAN);
    let shallow = unit(SHALLOW_OCEAN);
    let (w, h) = (maps.elevation.width, maps.elevation.height);
    ColorField::from_fn(w, h, |r, c| {
        let i = r * w + c;
        let e = maps.elevation.data[i];
        if ocean.data[i] {
            let depth = ((SEA_LEVEL - e) / OCEAN_DEPTH_RANGE).clamp(0.0, 1.0);
            lerp(deep, shallow, depth)
        } else if maps.mask.data[i] {
            unit(classify_land(e, maps.moisture.data[i], maps.temperature.data[i]).color())
        } else {
            [0.0; 3]
        }
    })
}

/// Blend river colour in proportion to intensity.
fn overlay_rivers(color: &mut ColorField, rivers: &Grid<f32>) {
    if !rivers.data.iter().any(|&r| r > 0.0) {
        return;
    }
    let river = unit(RIVER);
    for (c, &r) in color.data.iter_mut().zip(rivers.data.iter()) {
        let strength = r.clamp(0.0, 1.0) * RIVER_MAX_BLEND;
        *c = add(scale(*c, 1.0 - strength), scale(river, strength));
    }
}

/// Shade a finished set of maps. Pure: the same maps always give the same buffer.
pub fn shade(maps: &PlanetMaps) -> RgbBuffer {
    let ocean = ocean_mask(maps);

    let mut color = surface_color(maps, &ocean);
    overlay_rivers(&mut color, &maps.rivers);

    let normals = compute_normals(&maps.elevation, &maps.mask);
    let light = light_direction();
    let city = unit(CITY_LIGHTS);
    let atmosphere = unit(ATMOSPHERE);
    let space = unit(SPACE);
    let radius = maps.radius;
    let edge = radius * ATMOSPHERE_WIDTH;

    let mut result = ColorField::new(color.width, color.height, space);
    for i in 0..result.len() {
        let d = maps.distance.data[i];

        if maps.mask.data[i] {
            let base = color.data[i];
            let (day, night) = light_terms(normals.data[i], light);

            let mut shaded = add(
                scale(base, AMBIENT + DIFFUSE * day),
                scale(base, NIGHT_AMBIENT * night),
            );
            if ocean.data[i] {
                let spec = day.powi(SPECULAR_EXPONENT) * SPECULAR_STRENGTH;
                shaded = add(shaded, [spec; 3]);
            }
            shaded = add(shaded, scale(city, maps.cities.data[i] * night * CITY_GLOW));

            let strength = ((radius + edge - d) / edge)
                .clamp(0.0, 1.0)
                .powf(ATMOSPHERE_EXPONENT);
            shaded = add(shaded, scale(atmosphere, strength * ATMOSPHERE_TINT));

            result.data[i] = shaded.map(|v| v.clamp(0.0, 1.0));
        } else if d <= radius + edge {
            let g = (1.0 - (d - radius) / edge).clamp(0.0, 1.0).powi(2);
            let bg = result.data[i];
            result.data[i] = add(scale(bg, 1.0 - g * LIMB_GLOW), scale(atmosphere, g * LIMB_GLOW));
        }
    }

    debug!(ocean_pixels = ocean.count(), "planet shaded");
    RgbBuffer::from_color_field(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ScalarField;
    use crate::normals::FLAT_NORMAL;
    use crate::terrain::DiscGeometry;
    use approx::assert_abs_diff_eq;

    /// Uniform maps over a `n × n` disc.
    fn uniform_maps(n: usize, elevation: f32, rivers: f32, cities: f32) -> PlanetMaps {
        let g = DiscGeometry::new(n, n);
        PlanetMaps {
            elevation: ScalarField::new(n, n, elevation),
            moisture: ScalarField::new(n, n, 0.5),
            temperature: ScalarField::new(n, n, 0.5),
            rivers: ScalarField::new(n, n, rivers),
            cities: ScalarField::new(n, n, cities),
            mask: g.mask,
            distance: g.distance,
            radius: g.radius,
        }
    }

    #[test]
    fn light_is_unit_and_terms_split_sign() {
        let l = light_direction();
        assert_abs_diff_eq!(l[0] * l[0] + l[1] * l[1] + l[2] * l[2], 1.0, epsilon = 1e-6);
        let (day, night) = light_terms([0.0, 0.0, 1.0], l);
        assert!(day > 0.8 && night == 0.0);
        let (day, night) = light_terms([-l[0], -l[1], -l[2]], l);
        assert_eq!(day, 0.0);
        assert_abs_diff_eq!(night, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn background_and_ocean() {
        let buf = shade(&uniform_maps(32, -0.5, 0.0, 0.0));
        assert_eq!((buf.width, buf.height, buf.data.len()), (32, 32, 32 * 32 * 3));
        assert_eq!(buf.pixel(0, 0), space_pixel(), "corner is deep space");
        let [r, _, b] = buf.pixel(16, 16);
        assert!(b > r, "ocean should be blue, got r={r} b={b}");
    }

    #[test]
    fn limb_glow_brightens_space_just_outside_rim() {
        // Radius 15.2, band 0.912: (16, 0) sits at distance 16.
        let maps = uniform_maps(32, -0.5, 0.0, 0.0);
        assert!(!maps.mask.get(16, 0));
        let buf = shade(&maps);
        assert!(buf.pixel(16, 0)[2] > space_pixel()[2]);
    }

    #[test]
    fn rivers_tint_land_blue() {
        let dry = shade(&uniform_maps(32, 0.2, 0.0, 0.0));
        let wet = shade(&uniform_maps(32, 0.2, 1.0, 0.0));
        assert!(wet.pixel(16, 16)[2] > dry.pixel(16, 16)[2]);
    }

    #[test]
    fn city_glow_needs_night_side() {
        // Flat terrain faces the light everywhere, so there is no night side to glow on.
        let dark = shade(&uniform_maps(32, 0.2, 0.0, 0.0));
        let lit = shade(&uniform_maps(32, 0.2, 0.0, 1.0));
        assert_eq!(dark, lit);
    }

    #[test]
    fn shading_is_pure() {
        let maps = uniform_maps(24, 0.1, 0.3, 0.5);
        assert_eq!(shade(&maps), shade(&maps));
    }

    /// `maps` with elevation rising 3 units per column, so the surface faces away from the light.
    fn east_facing(n: usize, cities: f32) -> PlanetMaps {
        let mut maps = uniform_maps(n, 0.0, 0.0, cities);
        maps.elevation = ScalarField::from_fn(n, n, |_, c| c as f32 * 3.0);
        maps
    }

    fn assert_pixel_near(got: [u8; 3], expected: Rgb) {
        let want = quantize(expected);
        for k in 0..3 {
            assert!(
                (got[k] as i32 - want[k] as i32).abs() <= 1,
                "channel {k}: got {got:?}, expected {want:?}"
            );
        }
    }

    #[test]
    fn night_side_gets_faint_ambient_and_atmosphere() {
        let maps = east_facing(32, 0.0);
        let normals = compute_normals(&maps.elevation, &maps.mask);
        let (day, night) = light_terms(normals.get(16, 16), light_direction());
        assert_eq!(day, 0.0);
        assert!(night > 0.1, "slope should turn the pixel away from the light, night={night}");

        // Elevation 48 is snow; full atmosphere tint applies inside the disc.
        let base = unit(palette::Biome::Snow.color());
        let expected = add(
            scale(base, AMBIENT + NIGHT_AMBIENT * night),
            scale(unit(ATMOSPHERE), ATMOSPHERE_TINT),
        );
        assert_pixel_near(shade(&maps).pixel(16, 16), expected);
    }

    #[test]
    fn city_lights_glow_on_night_side() {
        let dark = shade(&east_facing(32, 0.0)).pixel(16, 16);
        let lit = shade(&east_facing(32, 1.0)).pixel(16, 16);
        assert!(lit[0] > dark[0] + 20, "city glow should warm the night side: {dark:?} -> {lit:?}");
        assert!((0..3).all(|k| lit[k] >= dark[k]));
    }

    #[test]
    fn ocean_gets_specular_highlight() {
        let maps = uniform_maps(32, -0.5, 0.0, 0.0);
        let (day, night) = light_terms(FLAT_NORMAL, light_direction());
        assert_eq!(night, 0.0);

        let depth = 0.5 / OCEAN_DEPTH_RANGE;
        let water = scale(lerp(unit(DEEP_OCEAN), unit(SHALLOW_OCEAN), depth), AMBIENT + DIFFUSE * day);
        let tint = scale(unit(ATMOSPHERE), ATMOSPHERE_TINT);
        let spec = day.powi(SPECULAR_EXPONENT) * SPECULAR_STRENGTH;
        assert!(spec > 0.1);

        let got = shade(&maps).pixel(16, 16);
        assert_pixel_near(got, add(add(water, [spec; 3]), tint));
        let matte = quantize(add(water, tint));
        assert!(got[0] > matte[0] + 20, "specular should lift every channel: {got:?} vs {matte:?}");
    }

    #[test]
    fn sea_level_counts_as_ocean() {
        assert!(is_ocean(0.0));
        assert!(is_ocean(-0.01));
        assert!(!is_ocean(0.01));
        let maps = uniform_maps(16, 0.0, 0.0, 0.0);
        let ocean = ocean_mask(&maps);
        assert_eq!(ocean, maps.mask, "every on-disc pixel at sea level is water");
    }

    #[test]
    fn quantize_truncates_and_clips() {
        assert_eq!(quantize([1.5, -0.2, 0.5]), [255, 0, 127]);
    }
}
