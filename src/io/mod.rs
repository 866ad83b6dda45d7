// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - cell geometry parsing and scene files

mod parser;
mod scene;

pub use parser::{parse_cell_geometry, CellExpr};
pub use scene::{BuiltCell, BuiltScene, CellSpec, Scene, SurfaceKind, SurfaceSpec};
