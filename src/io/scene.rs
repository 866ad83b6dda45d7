// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene files: numbered surfaces and cells in TOML or JSON

use super::parser::{parse_cell_geometry, CellExpr};
use crate::geometry::{Cylinder, Plane, Sphere, Surface};
use crate::shape::{ShapeArena, ShapeId, SurfaceId};
use anyhow::{bail, Context, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Surfaces and cells of a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub surfaces: Vec<SurfaceSpec>,
    #[serde(default)]
    pub cells: Vec<CellSpec>,
}

/// Numbered surface definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub number: u32,
    #[serde(flatten)]
    pub kind: SurfaceKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SurfaceKind {
    /// `normal . x + offset = 0`
    Plane { normal: [f64; 3], offset: f64 },
    Sphere { center: [f64; 3], radius: f64 },
    Cylinder {
        point: [f64; 3],
        axis: [f64; 3],
        radius: f64,
    },
}

impl SurfaceKind {
    fn to_surface(&self) -> Result<Box<dyn Surface>> {
        let surface: Box<dyn Surface> = match self {
            SurfaceKind::Plane { normal, offset } => {
                let normal = Vector3::from(*normal);
                if normal.norm() == 0.0 {
                    bail!("Plane normal must not be zero");
                }
                Box::new(Plane::new(normal, *offset))
            }
            SurfaceKind::Sphere { center, radius } => {
                check_radius(*radius)?;
                Box::new(Sphere::new(Point3::from(*center), *radius))
            }
            SurfaceKind::Cylinder {
                point,
                axis,
                radius,
            } => {
                check_radius(*radius)?;
                let axis = Vector3::from(*axis);
                if axis.norm() == 0.0 {
                    bail!("Cylinder axis must not be zero");
                }
                Box::new(Cylinder::new(Point3::from(*point), axis, *radius))
            }
        };
        Ok(surface)
    }
}

fn check_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        bail!("Radius must be positive, got {radius}");
    }
    Ok(())
}

/// Numbered cell with its geometry expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub geometry: String,
}

/// Scene registered in an arena
#[derive(Debug)]
pub struct BuiltScene {
    pub arena: ShapeArena,
    pub surfaces: HashMap<u32, SurfaceId>,
    pub cells: Vec<BuiltCell>,
}

#[derive(Debug, Clone)]
pub struct BuiltCell {
    pub number: u32,
    pub name: Option<String>,
    pub expr: CellExpr,
    pub shape: ShapeId,
}

impl BuiltCell {
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({name})", self.number),
            None => self.number.to_string(),
        }
    }
}

impl BuiltScene {
    pub fn cell(&self, number: u32) -> Option<&BuiltCell> {
        self.cells.iter().find(|cell| cell.number == number)
    }
}

impl Scene {
    /// Load a scene; `.json` files are read as JSON, anything else as TOML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file: {path:?}"))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let scene = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };
        scene.with_context(|| format!("Failed to load scene file: {path:?}"))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML scene")
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse JSON scene")
    }

    /// Register surfaces and cells in a fresh arena.
    ///
    /// Cells may complement only cells defined before them.
    pub fn build(&self) -> Result<BuiltScene> {
        let mut arena = ShapeArena::new();
        let mut surfaces = HashMap::new();
        for spec in &self.surfaces {
            let surface = spec
                .kind
                .to_surface()
                .with_context(|| format!("Invalid surface {}", spec.number))?;
            if surfaces
                .insert(spec.number, arena.add_boxed_surface(surface))
                .is_some()
            {
                bail!("Duplicate surface number {}", spec.number);
            }
        }

        let mut shapes = HashMap::new();
        let mut cells = Vec::with_capacity(self.cells.len());
        for spec in &self.cells {
            let expr = parse_cell_geometry(&spec.geometry)
                .with_context(|| format!("Invalid geometry of cell {}", spec.number))?;
            if let Some(missing) = expr.surfaces().into_iter().find(|n| !surfaces.contains_key(n)) {
                bail!("Cell {} uses undefined surface {missing}", spec.number);
            }
            let shape = expr
                .build(&mut arena, &surfaces, &shapes)
                .with_context(|| format!("Failed to build cell {}", spec.number))?;
            if shapes.insert(spec.number, shape).is_some() {
                bail!("Duplicate cell number {}", spec.number);
            }
            debug!(cell = spec.number, geometry = %expr, "cell built");
            cells.push(BuiltCell {
                number: spec.number,
                name: spec.name.clone(),
                expr,
                shape,
            });
        }

        Ok(BuiltScene {
            arena,
            surfaces,
            cells,
        })
    }
}
