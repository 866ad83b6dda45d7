// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - boxes, surfaces and the classification algebra

pub mod classification;
mod bbox;
mod subdiv;
mod surface;

pub use classification::Classification;
pub use bbox::{SplitDirection, SubdivBox, GLOBAL_BOX_SIZE};
pub use subdiv::{BoxRelation, SubdivCode};
pub use surface::{Cylinder, Plane, Sphere, Surface};
