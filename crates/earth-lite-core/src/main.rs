// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # earth-inspect
//!
//! Imports a polygon shapefile the way the globe viewer does and prints what
//! ended up in the scene.
//!
//! ## Usage
//!
//! ```bash
//! earth-inspect ne_110m_land.shp
//!
//! # Custom outline altitude and config file
//! earth-inspect countries.shp --outline-altitude 500 --config globe.toml
//!
//! # Show every warning and debug logging
//! RUST_LOG=debug earth-inspect countries.shp --warnings
//! ```

use anyhow::Context;
use clap::Parser;
use earth_lite_core::{Globe, GlobeConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "earth-inspect")]
#[command(about = "Import a polygon shapefile onto the WGS84 globe and report the scene")]
#[command(version)]
struct Args {
    /// Shapefile (.shp) to import
    path: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Outline altitude in meters (overrides the config file)
    #[arg(short, long)]
    outline_altitude: Option<f64>,

    /// List every warning instead of a count
    #[arg(short, long)]
    warnings: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GlobeConfig::load(path)?,
        None => GlobeConfig::default(),
    };
    if let Some(meters) = args.outline_altitude {
        config = config.with_outline_altitude(meters);
    }

    let globe = Globe::with_config(config)?;
    let scene = globe
        .import(&args.path)
        .with_context(|| format!("importing {}", args.path.display()))?;

    let stats = scene.stats();
    println!("source:           {}", scene.source().unwrap_or_default());
    println!("meshes:           {}", stats.meshes);
    println!("filled meshes:    {}", stats.filled_meshes);
    println!("triangles:        {}", stats.triangles);
    println!("outline vertices: {}", stats.outline_vertices);
    println!("warnings:         {}", stats.warnings);

    if args.warnings {
        for warning in scene.warnings() {
            println!("  {}", warning);
        }
    }

    Ok(())
}
