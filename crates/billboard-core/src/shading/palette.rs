//! Colours and land biome classification.
//!
//! Colours are stored as 8-bit triples and converted to `[0, 1]` floats with
//! [`unit`] at the point of use.

use serde::{Deserialize, Serialize};

pub type Rgb8 = [u8; 3];
pub type Rgb = [f32; 3];

pub const SPACE: Rgb8 = [3, 7, 18];
pub const DEEP_OCEAN: Rgb8 = [5, 34, 92];
pub const SHALLOW_OCEAN: Rgb8 = [24, 105, 164];
pub const RIVER: Rgb8 = [54, 129, 196];
pub const CITY_LIGHTS: Rgb8 = [255, 202, 92];
pub const ATMOSPHERE: Rgb8 = [72, 124, 255];

/// Convert an 8-bit colour to `[0, 1]` channels.
#[inline]
pub fn unit(c: Rgb8) -> Rgb {
    [c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0]
}

/// Land colour classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    /// Land matching no rule.
    Plains,
    Desert,
    Shrubland,
    Forest,
    Jungle,
    Grassland,
    Taiga,
    Mountain,
    Snow,
}

impl Biome {
    pub fn color(self) -> Rgb8 {
        match self {
            Biome::Plains    => [108, 130,  92],
            Biome::Desert    => [201, 179, 101],
            Biome::Shrubland => [166, 148, 102],
            Biome::Forest    => [ 36,  94,  58],
            Biome::Jungle    => [ 28,  82,  44],
            Biome::Grassland => [ 92, 136,  76],
            Biome::Taiga     => [ 70, 102,  74],
            Biome::Mountain  => [140, 132, 124],
            Biome::Snow      => [235, 243, 250],
        }
    }
}

/// Classify a land pixel.
///
/// Rules are evaluated in the order desert, shrubland, forest, jungle,
/// grassland, taiga, mountain, snow; where several match, the later one wins.
/// Mountain and snow therefore override every moisture/temperature biome.
pub fn classify_land(elevation: f32, moisture: f32, temperature: f32) -> Biome {
    let desert = moisture < 0.25 && temperature > 0.45;
    let shrubland = moisture < 0.4 && !desert;
    let forest = moisture > 0.68 && temperature > 0.3;
    let jungle = moisture > 0.78 && temperature > 0.55;
    let grassland = moisture > 0.45 && !forest && !jungle;
    let taiga = temperature < 0.35 && moisture > 0.35;
    let mountain = elevation > 0.52;
    let snow = temperature < 0.22 || elevation > 0.68;

    [
        (snow, Biome::Snow),
        (mountain, Biome::Mountain),
        (taiga, Biome::Taiga),
        (grassland, Biome::Grassland),
        (jungle, Biome::Jungle),
        (forest, Biome::Forest),
        (shrubland, Biome::Shrubland),
        (desert, Biome::Desert),
    ]
    .into_iter()
    .find_map(|(hit, biome)| hit.then_some(biome))
    .unwrap_or(Biome::Plains)
}
