// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Surfaces bounding CSG cells
//!
//! A surface splits space by the sign of its function. The positive sense
//! (function value >= 0) classifies as `Inside` for the surface itself; shapes
//! select the negative sense through complement.

use super::bbox::SubdivBox;
use super::classification::Classification;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometric surface consumed by the classifiers
pub trait Surface: fmt::Debug + Send + Sync {
    /// Classify a box against the positive sense of the surface.
    ///
    /// `Ambiguous` is always an acceptable answer; `Inside` and `Outside`
    /// must hold for every point of the box.
    fn classify_box(&self, bx: &SubdivBox) -> Classification;

    /// Classify points, writing one resolved value per point into `out`
    fn classify_points(&self, points: &[Point3<f64>], out: &mut [Classification]);

    /// Short kind name for logs and reports
    fn name(&self) -> &str {
        "surface"
    }
}

fn classify_range(min: f64, max: f64) -> Classification {
    if min >= 0.0 {
        Classification::Inside
    } else if max < 0.0 {
        Classification::Outside
    } else {
        Classification::Ambiguous
    }
}

/// Plane `normal . x + offset = 0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    normal: Vector3<f64>,
    offset: f64,
}

impl Plane {
    pub fn new(normal: Vector3<f64>, offset: f64) -> Self {
        Self { normal, offset }
    }

    pub fn func(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }
}

impl Surface for Plane {
    fn name(&self) -> &str {
        "plane"
    }

    fn classify_box(&self, bx: &SubdivBox) -> Classification {
        let at_center = self.func(bx.center());
        let half = bx.half_dims();
        let reach: f64 = (0..3)
            .map(|i| self.normal.dot(&bx.basis()[i]).abs() * half[i])
            .sum();
        classify_range(at_center - reach, at_center + reach)
    }

    fn classify_points(&self, points: &[Point3<f64>], out: &mut [Classification]) {
        for (slot, point) in out.iter_mut().zip(points) {
            *slot = Classification::from_sign(self.func(point));
        }
    }
}

/// Sphere `|x - center|^2 - radius^2 = 0`; the positive sense is outside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    center: Point3<f64>,
    radius: f64,
}

impl Sphere {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn func(&self, point: &Point3<f64>) -> f64 {
        (point - self.center).norm_squared() - self.radius * self.radius
    }
}

impl Surface for Sphere {
    fn name(&self) -> &str {
        "sphere"
    }

    fn classify_box(&self, bx: &SubdivBox) -> Classification {
        let local = bx.to_local(&self.center);
        let half = bx.half_dims();
        let mut nearest = 0.0;
        let mut farthest = 0.0;
        for i in 0..3 {
            let excess = (local[i].abs() - half[i]).max(0.0);
            nearest += excess * excess;
            let reach = local[i].abs() + half[i];
            farthest += reach * reach;
        }
        let r2 = self.radius * self.radius;
        classify_range(nearest - r2, farthest - r2)
    }

    fn classify_points(&self, points: &[Point3<f64>], out: &mut [Classification]) {
        for (slot, point) in out.iter_mut().zip(points) {
            *slot = Classification::from_sign(self.func(point));
        }
    }
}

/// Infinite circular cylinder; the positive sense is outside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    point: Point3<f64>,
    axis: Vector3<f64>,
    radius: f64,
}

impl Cylinder {
    pub fn new(point: Point3<f64>, axis: Vector3<f64>, radius: f64) -> Self {
        Self {
            point,
            axis: axis.normalize(),
            radius,
        }
    }

    fn radial_distance(&self, point: &Point3<f64>) -> f64 {
        let delta = point - self.point;
        (delta - self.axis * delta.dot(&self.axis)).norm()
    }

    pub fn func(&self, point: &Point3<f64>) -> f64 {
        let d = self.radial_distance(point);
        d * d - self.radius * self.radius
    }
}

impl Surface for Cylinder {
    fn name(&self) -> &str {
        "cylinder"
    }

    // Conservative: the box is replaced by its circumscribed sphere.
    fn classify_box(&self, bx: &SubdivBox) -> Classification {
        let distance = self.radial_distance(bx.center());
        let reach = bx.half_dims().norm();
        if distance - reach >= self.radius {
            Classification::Inside
        } else if distance + reach < self.radius {
            Classification::Outside
        } else {
            Classification::Ambiguous
        }
    }

    fn classify_points(&self, points: &[Point3<f64>], out: &mut [Classification]) {
        for (slot, point) in out.iter_mut().zip(points) {
            *slot = Classification::from_sign(self.func(point));
        }
    }
}
