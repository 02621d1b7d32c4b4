//! Command-line front end: generate a planet billboard and save it as an image.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use billboard_core::{generate_maps, render, GenerationParams, RgbBuffer};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "billboard",
    about = "Generate a procedural 2D planet billboard with rivers, biomes, and city lights."
)]
struct Args {
    /// Planet image width in pixels [default: 1024]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Planet image height in pixels [default: 1024]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Random seed for reproducibility (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Output image file; the format follows the extension (png, jpg, ...)
    #[arg(short, long, default_value = "planet.png")]
    output: PathBuf,

    /// JSON file with `width`, `height` and `seed`; flags take precedence
    #[arg(long)]
    params: Option<PathBuf>,

    /// Also write every intermediate map as JSON to this path
    #[arg(long)]
    maps_json: Option<PathBuf>,

    /// Open the generated image in the system viewer after saving
    #[arg(long)]
    preview: bool,
}

// ── Parameter resolution ─────────────────────────────────────────────────────

/// True when the params document sets `seed` at the top level.
fn declares_seed(json: &str) -> Result<bool> {
    let doc: serde_json::Value = serde_json::from_str(json).context("params file is not valid JSON")?;
    Ok(doc.get("seed").is_some())
}

/// Merge the params file (if any) with explicit flags. A seed supplied by
/// neither is drawn at random.
fn resolve_params(args: &Args) -> Result<GenerationParams> {
    let mut params = match &args.params {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("cannot read params file {}", path.display()))?;
            let mut p = GenerationParams::from_json(&json)
                .with_context(|| format!("invalid params file {}", path.display()))?;
            if args.seed.is_none() && !declares_seed(&json)? {
                p.seed = rand::random::<u32>() as u64;
            }
            p
        }
        None => GenerationParams {
            seed: rand::random::<u32>() as u64,
            ..GenerationParams::default()
        },
    };

    if let Some(w) = args.width {
        params.width = w as usize;
    }
    if let Some(h) = args.height {
        params.height = h as usize;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    params.validate()?;
    Ok(params)
}

// ── Output ───────────────────────────────────────────────────────────────────

fn save_image(buffer: RgbBuffer, path: &PathBuf) -> Result<()> {
    let (w, h) = (buffer.width as u32, buffer.height as u32);
    let img = image::RgbImage::from_raw(w, h, buffer.into_raw())
        .context("image buffer does not match its dimensions")?;
    img.save(path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    Ok(())
}

// ── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let args = Args::parse();
    let params = resolve_params(&args)?;
    info!(width = params.width, height = params.height, seed = params.seed, "generating planet");

    let maps = generate_maps(params.width, params.height, params.seed);

    if let Some(path) = &args.maps_json {
        let json = serde_json::to_string(&maps).context("failed to serialise maps")?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "maps written");
    }

    save_image(render(&maps), &args.output)?;
    println!(
        "Generated planet saved to {} (seed={})",
        args.output.display(),
        params.seed
    );

    if args.preview {
        open::that(&args.output)
            .with_context(|| format!("failed to open {} in a viewer", args.output.display()))?;
    }
    Ok(())
}
