//! hornsim - Acoustic evaluation of horn geometries
//!
//! Copyright (C) 2025 Pierre Aubert pierre(at)spinorama(dot)org
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use clap::Parser;
use hornsim::{
    Ambient, EngineConfig, Profile, Report, ShapeFamily, ShapeParams, evaluate, generate,
    load_config, load_profile, save_profile,
};
use log::{debug, info};
use schemars::schema_for;
use serde::Serialize;
use std::path::PathBuf;

/// Evaluate a horn profile: impedance, directivity, frequency response and score
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Profile JSON file (array of {"z": mm, "radius": mm})
    #[arg(short, long, conflicts_with = "family")]
    profile: Option<PathBuf>,

    /// Shape family used to generate the profile
    #[arg(short, long, default_value = "smooth-sigmoid")]
    family: ShapeFamily,

    /// Throat diameter (mm)
    #[arg(long, default_value_t = 25.4)]
    throat: f64,

    /// Mouth diameter (mm)
    #[arg(long, default_value_t = 300.0)]
    mouth: f64,

    /// Horn length (mm)
    #[arg(long, default_value_t = 400.0)]
    length: f64,

    /// Number of profile intervals
    #[arg(long, default_value_t = 100)]
    points: usize,

    /// Flare exponent for power-law and fractal-modulated
    #[arg(long)]
    exponent: Option<f64>,

    /// Real part of the Mandelbrot constant
    #[arg(long, default_value_t = -0.75, allow_hyphen_values = true)]
    c_real: f64,

    /// Imaginary part of the Mandelbrot constant
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    c_imag: f64,

    /// Mandelbrot iterations across the horn length
    #[arg(long, default_value_t = 100)]
    iterations: u32,

    /// Lowest sweep frequency (Hz)
    #[arg(long, default_value_t = 500.0)]
    freq_min: f64,

    /// Highest sweep frequency (Hz)
    #[arg(long, default_value_t = 20000.0)]
    freq_max: f64,

    /// Number of sweep frequencies
    #[arg(long, default_value_t = 100)]
    freq_points: usize,

    /// Engine configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report JSON file (stdout when absent)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the evaluated profile as JSON
    #[arg(long)]
    save_profile: Option<PathBuf>,

    /// Dump JSON schema for the engine configuration
    #[arg(long)]
    schema: bool,
}

/// Report as written to disk
#[derive(Serialize)]
struct ReportFile<'a> {
    generated_at: String,
    tool_version: &'static str,
    source: String,
    report: &'a Report,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.schema {
        let schema = schema_for!(EngineConfig);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    run(args)
}

fn engine_config(args: &Args) -> Result<EngineConfig> {
    match &args.config {
        Some(path) => {
            info!("Loading engine configuration from {:?}", path);
            load_config(path)
                .with_context(|| format!("Failed to load configuration: {:?}", path))
        }
        None => {
            let ambient = Ambient::from_env().context("Invalid ambient override")?;
            Ok(EngineConfig::default().with_ambient(ambient))
        }
    }
}

fn build_profile(args: &Args) -> Result<(Profile, String)> {
    if let Some(path) = &args.profile {
        let profile = load_profile(path)
            .with_context(|| format!("Failed to load profile: {:?}", path))?;
        return Ok((profile, path.display().to_string()));
    }
    let params = ShapeParams {
        exponent: args.exponent,
        c_real: args.c_real,
        c_imag: args.c_imag,
        iterations: args.iterations,
        ..ShapeParams::default()
    };
    let profile = generate(
        args.family,
        args.throat / 2.0,
        args.mouth / 2.0,
        args.length,
        args.points,
        &params,
    )
    .with_context(|| format!("Failed to generate {} profile", args.family))?;
    debug!("generated {} points with {:?}", profile.len(), params);
    Ok((profile, args.family.to_string()))
}

fn run(args: Args) -> Result<()> {
    let config = engine_config(&args)?;
    let (profile, source) = build_profile(&args)?;

    if let Some(path) = &args.save_profile {
        save_profile(&profile, path)
            .with_context(|| format!("Failed to write profile: {:?}", path))?;
        info!("Profile written to {}", path.display());
    }

    let report = evaluate(
        &profile,
        args.freq_min,
        args.freq_max,
        args.freq_points,
        &config,
    )
    .context("Evaluation failed")?;

    info!(
        "{}: score {:.3} - {}",
        source,
        report.score.overall,
        report.score.recommendation.description()
    );

    let file = ReportFile {
        generated_at: chrono::Utc::now().to_rfc3339(),
        tool_version: env!("CARGO_PKG_VERSION"),
        source,
        report: &report,
    };
    let json = serde_json::to_string_pretty(&file)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
