// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! csg-cells
//!
//! Ternary classification of axis-aligned boxes and points against CSG cells
//! built from surfaces. Boxes are refined by bisection with memoized results,
//! which drives volume estimation, bounding-box search and per-child
//! classification statistics.

pub mod cli;
pub mod config;
pub mod error;
pub mod eval;
pub mod geometry;
pub mod io;
pub mod kernel;
pub mod shape;

pub use config::EvalConfig;
pub use error::{ShapeError, Status};
pub use eval::{EvaluationCache, Simplified, StatTable, StatTrigger, VolumeEstimate};
pub use geometry::{Classification, SubdivBox, SubdivCode, Surface};
pub use io::{parse_cell_geometry, Scene};
pub use kernel::Kernel;
pub use shape::{ShapeArena, ShapeId, SurfaceId};
