//! Diagnostic visualizer: writes one PNG per intermediate map to data/debug/.
//! Not part of the main pipeline; no tests.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use billboard_core::normals::compute_normals;
use billboard_core::shading::palette::{classify_land, DEEP_OCEAN, SPACE};
use billboard_core::shading::{is_ocean, ocean_mask};
use billboard_core::terrain::{ELEVATION_MAX, ELEVATION_MIN};
use billboard_core::{generate_maps, PlanetMaps, ScalarField};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "visualize", about = "Dump every planet map as a debug PNG.")]
struct Args {
    #[arg(long, default_value_t = 512)]
    width: usize,
    #[arg(long, default_value_t = 512)]
    height: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value = "data/debug")]
    out_dir: PathBuf,
}

// ── Colour helpers ────────────────────────────────────────────────────────────

/// `[0, 1]` → grayscale (0 = black, 1 = white).
fn gray(v: f32) -> [u8; 3] {
    let c = (v.clamp(0.0, 1.0) * 255.0) as u8;
    [c, c, c]
}

/// Elevation → blue below sea level, green-to-white above.
fn elevation_rgb(e: f32) -> [u8; 3] {
    if is_ocean(e) {
        let t = (e / ELEVATION_MIN).clamp(0.0, 1.0);
        [0, (120.0 * (1.0 - t)) as u8, (255.0 - 155.0 * t) as u8]
    } else {
        let t = (e / ELEVATION_MAX).clamp(0.0, 1.0);
        [(255.0 * t) as u8, (140.0 + 115.0 * t) as u8, (255.0 * t) as u8]
    }
}

/// Temperature → blue (cold) to red (hot).
fn heat_rgb(t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    [(255.0 * t) as u8, 40, (255.0 * (1.0 - t)) as u8]
}

// ── Output ────────────────────────────────────────────────────────────────────

fn write_png(
    out_dir: &Path,
    name: &str,
    maps: &PlanetMaps,
    pixel: impl Fn(usize) -> [u8; 3],
) -> Result<()> {
    let (w, h) = (maps.width(), maps.height());
    let mut img = image::RgbImage::new(w as u32, h as u32);
    for r in 0..h {
        for c in 0..w {
            img.put_pixel(c as u32, r as u32, image::Rgb(pixel(r * w + c)));
        }
    }
    let path = out_dir.join(name);
    img.save(&path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Off-disc pixels render as space.
fn masked<'a>(
    maps: &'a PlanetMaps,
    field: &'a ScalarField,
    color: fn(f32) -> [u8; 3],
) -> impl Fn(usize) -> [u8; 3] + 'a {
    move |i| if maps.mask.data[i] { color(field.data[i]) } else { SPACE }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.width > 0 && args.height > 0, "width and height must be positive");

    println!("Generating maps ({}×{}, seed {})…", args.width, args.height, args.seed);
    let maps = generate_maps(args.width, args.height, args.seed);

    let out_dir = args.out_dir.as_path();
    fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create {}", out_dir.display()))?;

    write_png(out_dir, "elevation.png", &maps, masked(&maps, &maps.elevation, elevation_rgb))?;
    write_png(out_dir, "moisture.png", &maps, masked(&maps, &maps.moisture, gray))?;
    write_png(out_dir, "temperature.png", &maps, masked(&maps, &maps.temperature, heat_rgb))?;
    write_png(out_dir, "rivers.png", &maps, |i| gray(maps.rivers.data[i]))?;
    write_png(out_dir, "cities.png", &maps, |i| gray(maps.cities.data[i]))?;
    write_png(out_dir, "mask.png", &maps, |i| gray(if maps.mask.data[i] { 1.0 } else { 0.0 }))?;

    // Biomes without lighting: ocean flat blue, land by classification.
    let ocean = ocean_mask(&maps);
    write_png(out_dir, "biomes.png", &maps, |i| {
        if !maps.mask.data[i] {
            SPACE
        } else if ocean.data[i] {
            DEEP_OCEAN
        } else {
            classify_land(maps.elevation.data[i], maps.moisture.data[i], maps.temperature.data[i])
                .color()
        }
    })?;

    // Normals packed as (n + 1) / 2 per channel.
    let normals = compute_normals(&maps.elevation, &maps.mask);
    write_png(out_dir, "normals.png", &maps, |i| {
        let n = normals.data[i];
        [0, 1, 2].map(|k| ((n[k] + 1.0) * 0.5 * 255.0).clamp(0.0, 255.0) as u8)
    })?;

    println!("Done.");
    Ok(())
}
