// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shape module - CSG trees over registered surfaces

mod arena;
mod node;
pub mod points;

pub use arena::{PolishToken, ShapeArena};
pub use node::{Combinator, Operation, Shape, ShapeId, ShapePayload, SurfaceId};
pub use points::{test_points, test_points_into};
