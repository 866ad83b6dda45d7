// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! csg-cells CLI

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use csg_cells::cli::{parse_point, PointSource, Reporter, Runner};
use csg_cells::config::EvalConfig;
use csg_cells::io::Scene;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "csg-cells")]
#[command(about = "CSG cell classification - volumes, bounds and statistics of cells", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to csg-cells.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit JSON instead of colored reports
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate cell volumes inside the global box
    Volume {
        /// Scene file (TOML or JSON)
        scene: PathBuf,

        /// Only this cell
        #[arg(long)]
        cell: Option<u32>,

        /// Override the minimum box volume
        #[arg(long)]
        min_volume: Option<f64>,
    },

    /// Find cell bounding boxes
    Bounds {
        /// Scene file (TOML or JSON)
        scene: PathBuf,

        /// Only this cell
        #[arg(long)]
        cell: Option<u32>,

        /// Override the absolute tolerance
        #[arg(short, long)]
        tolerance: Option<f64>,
    },

    /// Collect classification statistics and child coverages
    Stats {
        /// Scene file (TOML or JSON)
        scene: PathBuf,

        /// Only this cell
        #[arg(long)]
        cell: Option<u32>,

        /// Also list geometries this many surface senses more complex than the simplest
        #[arg(long, default_value = "0")]
        trim_size: usize,
    },

    /// Classify points against cells
    Points {
        /// Scene file (TOML or JSON)
        scene: PathBuf,

        /// Only this cell
        #[arg(long)]
        cell: Option<u32>,

        /// Point as x,y,z (repeatable)
        #[arg(short, long = "point", value_name = "X,Y,Z", allow_hyphen_values = true)]
        points: Vec<String>,

        /// Sample this many random points in the global box instead
        #[arg(long, conflicts_with = "points")]
        samples: Option<usize>,

        /// Seed for random sampling
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Parse a scene file and list its cells
    Parse {
        /// Scene file (TOML or JSON)
        scene: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = EvalConfig::from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => EvalConfig::load()?,
    };

    let result = match &cli.command {
        Commands::Volume {
            scene,
            cell,
            min_volume,
        } => {
            if let Some(min_volume) = min_volume {
                config.min_volume = *min_volume;
            }
            config.validate()?;
            let reports = Runner::from_file(scene, config)?.volume(*cell)?;
            emit(cli.json, &reports, Reporter::report_volume)
        }
        Commands::Bounds {
            scene,
            cell,
            tolerance,
        } => {
            if let Some(tolerance) = tolerance {
                config.tolerance = *tolerance;
            }
            config.validate()?;
            let reports = Runner::from_file(scene, config)?.bounds(*cell)?;
            emit(cli.json, &reports, Reporter::report_bounds)
        }
        Commands::Stats {
            scene,
            cell,
            trim_size,
        } => {
            let reports = Runner::from_file(scene, config)?.stats(*cell, *trim_size)?;
            emit(cli.json, &reports, Reporter::report_stats)
        }
        Commands::Points {
            scene,
            cell,
            points,
            samples,
            seed,
        } => {
            let source = match samples {
                Some(count) => PointSource::Random {
                    count: *count,
                    seed: *seed,
                },
                None if points.is_empty() => bail!("Give --point or --samples"),
                None => PointSource::Explicit(
                    points
                        .iter()
                        .map(|text| parse_point(text))
                        .collect::<Result<Vec<_>>>()?,
                ),
            };
            let reports = Runner::from_file(scene, config)?.points(*cell, &source)?;
            emit(cli.json, &reports, Reporter::report_points)
        }
        Commands::Parse { scene } => parse_command(scene, cli.json),
        Commands::Version => {
            println!("csg-cells v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(err) = &result {
        if !cli.json {
            Reporter::report_error(&format!("{err:#}"));
            std::process::exit(1);
        }
    }
    result
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "csg_cells=debug" } else { "csg_cells=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn emit<T: Serialize>(json: bool, reports: &[T], report: fn(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
    } else {
        reports.iter().for_each(report);
    }
    Ok(())
}

fn parse_command(path: &Path, json: bool) -> Result<()> {
    let scene = Scene::from_file(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&scene)?);
        return Ok(());
    }
    Reporter::report_scene(&scene.build()?);
    Ok(())
}
