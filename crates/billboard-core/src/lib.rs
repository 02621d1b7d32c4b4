//! Procedural planet billboard: a seeded planet seen as a flat disc, with
//! biomes, rivers, city lights, day/night lighting and an atmospheric limb.
//!
//! ```no_run
//! let maps = billboard_core::generate_maps(512, 512, 42);
//! let image = billboard_core::render(&maps);
//! assert_eq!(image.data.len(), 512 * 512 * 3);
//! ```

pub mod climate;
pub mod generator;
pub mod grid;
pub mod hydrology;
pub mod noise;
pub mod normals;
pub mod params;
pub mod settlements;
pub mod shading;
pub mod terrain;

pub use generator::{generate, generate_maps, render, PlanetGenerator, PlanetMaps};
pub use grid::{Grid, Mask, NormalField, ScalarField};
pub use params::{GenerationParams, ParamsError};
pub use shading::RgbBuffer;
