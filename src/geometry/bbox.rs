// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Oriented boxes that remember their place in a split hierarchy

use super::subdiv::{BoxRelation, SubdivCode};
use crate::error::ShapeError;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Edge length of the global box, centered at the origin
pub const GLOBAL_BOX_SIZE: f64 = 5000.0;

const CORNER_SIGNS: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
];

/// Axis selection for [`SubdivBox::split`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitDirection {
    /// Split across the largest dimension
    Auto,
    /// Split across the given local axis (0, 1 or 2)
    Axis(usize),
}

/// Oriented box with a local orthonormal basis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubdivBox {
    center: Point3<f64>,
    basis: [Vector3<f64>; 3],
    dims: Vector3<f64>,
    volume: f64,
    corners: [Point3<f64>; 8],
    lower: Point3<f64>,
    upper: Point3<f64>,
    code: SubdivCode,
}

impl SubdivBox {
    /// Create the root box of a new split hierarchy.
    ///
    /// `dims` are full edge lengths along the basis vectors. Basis vectors
    /// are normalized; they must be mutually orthogonal.
    pub fn new(
        center: Point3<f64>,
        dims: Vector3<f64>,
        basis: [Vector3<f64>; 3],
    ) -> Result<Self, ShapeError> {
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(ShapeError::Failure(format!(
                "box dimensions must be positive, got {:?}",
                dims.as_slice()
            )));
        }
        let mut unit = basis;
        for axis in unit.iter_mut() {
            let norm = axis.norm();
            if norm < 1e-12 {
                return Err(ShapeError::Failure("degenerate box basis vector".into()));
            }
            *axis /= norm;
        }
        const ORTHO_EPS: f64 = 1e-9;
        if unit[0].dot(&unit[1]).abs() > ORTHO_EPS
            || unit[0].dot(&unit[2]).abs() > ORTHO_EPS
            || unit[1].dot(&unit[2]).abs() > ORTHO_EPS
        {
            return Err(ShapeError::Failure("box basis is not orthogonal".into()));
        }
        Ok(Self::from_parts(center, dims, unit, SubdivCode::ROOT))
    }

    /// Root box aligned with the global axes
    pub fn axis_aligned(center: Point3<f64>, dims: Vector3<f64>) -> Result<Self, ShapeError> {
        Self::new(center, dims, [Vector3::x(), Vector3::y(), Vector3::z()])
    }

    /// Cube of [`GLOBAL_BOX_SIZE`] centered at the origin
    pub fn global() -> Self {
        let size = GLOBAL_BOX_SIZE;
        Self::from_parts(
            Point3::origin(),
            Vector3::new(size, size, size),
            [Vector3::x(), Vector3::y(), Vector3::z()],
            SubdivCode::ROOT,
        )
    }

    fn from_parts(
        center: Point3<f64>,
        dims: Vector3<f64>,
        basis: [Vector3<f64>; 3],
        code: SubdivCode,
    ) -> Self {
        let mut corners = [center; 8];
        for (corner, signs) in corners.iter_mut().zip(CORNER_SIGNS.iter()) {
            for axis in 0..3 {
                *corner += basis[axis] * (0.5 * signs[axis] * dims[axis]);
            }
        }

        let mut lower = corners[0];
        let mut upper = corners[0];
        for corner in &corners[1..] {
            for j in 0..3 {
                lower[j] = lower[j].min(corner[j]);
                upper[j] = upper[j].max(corner[j]);
            }
        }

        Self {
            center,
            basis,
            dims,
            volume: dims.x * dims.y * dims.z,
            corners,
            lower,
            upper,
            code,
        }
    }

    /// Copy of this box that starts a new hierarchy
    pub fn rooted(&self) -> Self {
        Self {
            code: SubdivCode::ROOT,
            ..self.clone()
        }
    }

    /// Copy of this box that takes part in no hierarchy
    pub fn detached(&self) -> Self {
        Self {
            code: SubdivCode::UNTRACKED,
            ..self.clone()
        }
    }

    pub fn center(&self) -> &Point3<f64> {
        &self.center
    }

    pub fn basis(&self) -> &[Vector3<f64>; 3] {
        &self.basis
    }

    /// Full edge lengths along the local axes
    pub fn dims(&self) -> &Vector3<f64> {
        &self.dims
    }

    pub fn half_dims(&self) -> Vector3<f64> {
        self.dims * 0.5
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn corners(&self) -> &[Point3<f64>; 8] {
        &self.corners
    }

    /// Axis-aligned lower and upper bounds in global coordinates
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        (self.lower, self.upper)
    }

    pub fn code(&self) -> SubdivCode {
        self.code
    }

    /// Containment of `self` in a box tested earlier
    pub fn relation(&self, tested: &SubdivBox) -> BoxRelation {
        self.code.relation(tested.code)
    }

    /// Coordinates of `point` in the local frame, relative to the center
    pub fn to_local(&self, point: &Point3<f64>) -> Vector3<f64> {
        let delta = point - self.center;
        Vector3::new(
            delta.dot(&self.basis[0]),
            delta.dot(&self.basis[1]),
            delta.dot(&self.basis[2]),
        )
    }

    /// Split the box in two across one axis.
    ///
    /// The first box covers the lower `ratio` share of the chosen axis.
    pub fn split(&self, direction: SplitDirection, ratio: f64) -> (SubdivBox, SubdivBox) {
        debug_assert!(ratio > 0.0 && ratio < 1.0, "split ratio {ratio} out of range");
        let axis = match direction {
            SplitDirection::Auto => self.dims.imax(),
            SplitDirection::Axis(axis) => axis,
        };

        let mut dims1 = self.dims;
        let mut dims2 = self.dims;
        dims1[axis] *= ratio;
        dims2[axis] *= 1.0 - ratio;

        let center1 = self.center - self.basis[axis] * (0.5 * dims2[axis]);
        let center2 = self.center + self.basis[axis] * (0.5 * dims1[axis]);

        let (code1, code2) = self.code.children();
        (
            Self::from_parts(center1, dims1, self.basis, code1),
            Self::from_parts(center2, dims2, self.basis, code2),
        )
    }

    /// Strict interior test for a batch of points
    pub fn test_points(&self, points: &[Point3<f64>]) -> Vec<bool> {
        let half = self.half_dims();
        points
            .iter()
            .map(|p| {
                let local = self.to_local(p);
                (0..3).all(|i| local[i].abs() < half[i])
            })
            .collect()
    }

    /// Points sampled uniformly inside the box
    pub fn random_points<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Point3<f64>> {
        (0..count)
            .map(|_| {
                let mut point = self.center;
                for axis in 0..3 {
                    let offset = (rng.gen::<f64>() - 0.5) * self.dims[axis];
                    point += self.basis[axis] * offset;
                }
                point
            })
            .collect()
    }
}
