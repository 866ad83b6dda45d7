// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Command runner evaluating the cells of a scene

use crate::config::EvalConfig;
use crate::eval::{Simplified, StatTable};
use crate::geometry::{Classification, SubdivBox};
use crate::io::{BuiltCell, BuiltScene, CellExpr, Scene};
use crate::kernel::Kernel;
use crate::shape::SurfaceId;
use anyhow::{anyhow, Context, Result};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

/// Volume of one cell inside the global box
#[derive(Debug, Clone, Serialize)]
pub struct VolumeReport {
    pub cell: String,
    pub volume: f64,
    pub unresolved: f64,
    pub duration: Duration,
}

/// Bounding box of one cell
#[derive(Debug, Clone, Serialize)]
pub struct BoundsReport {
    pub cell: String,
    pub lower: [f64; 3],
    pub upper: [f64; 3],
    pub duration: Duration,
}

/// Statistics and coverages of one cell
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub cell: String,
    pub result: Classification,
    pub table: Option<StatTable>,
    pub coverages: Vec<Vec<usize>>,
    /// Simplest equivalent geometries, simplest first
    pub simplest: Vec<String>,
}

/// Point classification of one cell
#[derive(Debug, Clone, Serialize)]
pub struct PointsReport {
    pub cell: String,
    pub points: Vec<[f64; 3]>,
    pub results: Vec<Classification>,
    /// Share of points inside times the sampled volume, for random samples
    pub sampled_volume: Option<f64>,
}

/// Where point classification takes its points from
#[derive(Debug, Clone)]
pub enum PointSource {
    Explicit(Vec<Point3<f64>>),
    Random { count: usize, seed: u64 },
}

/// Runner for evaluating scene cells
pub struct Runner {
    scene: BuiltScene,
    config: EvalConfig,
}

impl Runner {
    pub fn new(scene: BuiltScene, config: EvalConfig) -> Self {
        Self { scene, config }
    }

    /// Load and build a scene file
    pub fn from_file(path: impl AsRef<Path>, config: EvalConfig) -> Result<Self> {
        let scene = Scene::from_file(path.as_ref())?
            .build()
            .with_context(|| format!("Failed to build scene: {:?}", path.as_ref()))?;
        Ok(Self::new(scene, config))
    }

    pub fn scene(&self) -> &BuiltScene {
        &self.scene
    }

    /// Selected cells, or all cells of the scene when none is given
    pub fn cells(&self, selection: Option<u32>) -> Result<Vec<&BuiltCell>> {
        match selection {
            Some(number) => Ok(vec![self
                .scene
                .cell(number)
                .ok_or_else(|| anyhow!("Cell {number} is not defined"))?]),
            None => Ok(self.scene.cells.iter().collect()),
        }
    }

    fn kernel(&self, cell: &BuiltCell) -> Result<Kernel<'_>> {
        Kernel::with_config(&self.scene.arena, cell.shape, self.config.clone())
            .with_context(|| format!("Failed to prepare cell {}", cell.label()))
    }

    pub fn volume(&self, selection: Option<u32>) -> Result<Vec<VolumeReport>> {
        let global = self.config.global_box()?;
        self.cells(selection)?
            .into_iter()
            .map(|cell| -> Result<VolumeReport> {
                let start = Instant::now();
                let estimate = self.kernel(cell)?.volume(&global)?;
                Ok(VolumeReport {
                    cell: cell.label(),
                    volume: estimate.volume,
                    unresolved: estimate.unresolved,
                    duration: start.elapsed(),
                })
            })
            .collect()
    }

    pub fn bounds(&self, selection: Option<u32>) -> Result<Vec<BoundsReport>> {
        self.cells(selection)?
            .into_iter()
            .map(|cell| -> Result<BoundsReport> {
                let start = Instant::now();
                let mut bx = self.config.global_box()?;
                self.kernel(cell)?.bounding_box(&mut bx)?;
                let (lower, upper) = bx.bounds();
                Ok(BoundsReport {
                    cell: cell.label(),
                    lower: [lower.x, lower.y, lower.z],
                    upper: [upper.x, upper.y, upper.z],
                    duration: start.elapsed(),
                })
            })
            .collect()
    }

    /// Statistics, coverages and simplest geometries of the selected cells.
    ///
    /// Geometries more complex than the simplest one by over `trim_size`
    /// surface senses are left out.
    pub fn stats(&self, selection: Option<u32>, trim_size: usize) -> Result<Vec<StatsReport>> {
        let global = self.config.global_box()?;
        let numbers: HashMap<SurfaceId, u32> = self
            .scene
            .surfaces
            .iter()
            .map(|(number, id)| (*id, *number))
            .collect();
        self.cells(selection)?
            .into_iter()
            .map(|cell| -> Result<StatsReport> {
                let mut kernel = self.kernel(cell)?;
                let result = kernel.collect_statistics(&global)?;
                let simplest = kernel
                    .simplest(trim_size)
                    .iter()
                    .map(|shape| describe(shape, &numbers))
                    .collect::<Result<Vec<_>>>()?;
                Ok(StatsReport {
                    cell: cell.label(),
                    result,
                    table: kernel.stat_table(),
                    coverages: kernel.coverages(),
                    simplest,
                })
            })
            .collect()
    }

    pub fn points(&self, selection: Option<u32>, source: &PointSource) -> Result<Vec<PointsReport>> {
        let global = self.config.global_box()?;
        let (points, sampled) = match source {
            PointSource::Explicit(points) => (points.clone(), None),
            PointSource::Random { count, seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                (global.random_points(*count, &mut rng), Some(&global))
            }
        };
        self.cells(selection)?
            .into_iter()
            .map(|cell| -> Result<PointsReport> {
                let results = self.kernel(cell)?.test_points(&points)?;
                let sampled_volume = sampled.map(|bx: &SubdivBox| {
                    let inside = results
                        .iter()
                        .filter(|value| **value == Classification::Inside)
                        .count();
                    bx.volume() * inside as f64 / results.len().max(1) as f64
                });
                Ok(PointsReport {
                    cell: cell.label(),
                    points: points.iter().map(|p| [p.x, p.y, p.z]).collect(),
                    results,
                    sampled_volume,
                })
            })
            .collect()
    }
}

fn describe(shape: &Simplified, numbers: &HashMap<SurfaceId, u32>) -> Result<String> {
    match shape {
        Simplified::Constant(Classification::Inside) => Ok("universe".to_string()),
        Simplified::Constant(_) => Ok("empty".to_string()),
        _ => Ok(CellExpr::from_simplified(shape, numbers)?.to_string()),
    }
}

/// Parse a point written as `x,y,z`
pub fn parse_point(text: &str) -> Result<Point3<f64>> {
    let coords = text
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid coordinate {part:?} in point {text:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    match coords.as_slice() {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(anyhow!("Point {text:?} must have three coordinates")),
    }
}
