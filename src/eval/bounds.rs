// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box search by bisection along each local axis

use super::cache::EvaluationCache;
use super::classify::{check_positive, refine};
use crate::error::ShapeError;
use crate::geometry::{Classification, SplitDirection, SubdivBox};
use tracing::debug;

/// Shrink `bx` to the tightest box around the shape, within `tol`.
///
/// `bx` must contain the shape. Each face moves inward while the slab it
/// cuts off classifies as `Outside`; ambiguous slabs are refined down to
/// boxes of volume `tol^3`. The resulting box starts a new split hierarchy,
/// so node memos are cleared on return; collected statistics are kept.
pub fn bounding_box(
    cache: &mut EvaluationCache<'_>,
    bx: &mut SubdivBox,
    tol: f64,
) -> Result<(), ShapeError> {
    check_positive("tol", tol)?;
    let min_volume = tol * tol * tol;
    let mut current = bx.rooted();
    shrink(cache, &mut current, tol, min_volume);
    cache.clear_memos();
    *bx = current;
    Ok(())
}

fn shrink(cache: &mut EvaluationCache<'_>, current: &mut SubdivBox, tol: f64, min_volume: f64) {
    for axis in 0..3 {
        // Far face: `lower` is the extent known to be needed from the near face
        let mut lower = 0.0;
        while current.dims()[axis] - lower > tol {
            let size = current.dims()[axis];
            let ratio = 0.5 * (lower + size) / size;
            let (near, far) = current.split(SplitDirection::Axis(axis), ratio);
            if is_outside(cache, &far, min_volume) {
                *current = near.rooted();
            } else {
                lower = near.dims()[axis];
            }
        }

        // Near face, symmetric
        let mut upper = 0.0;
        while current.dims()[axis] - upper > tol {
            let size = current.dims()[axis];
            let ratio = 0.5 * (size - upper) / size;
            let (near, far) = current.split(SplitDirection::Axis(axis), ratio);
            if is_outside(cache, &near, min_volume) {
                *current = far.rooted();
            } else {
                upper = far.dims()[axis];
            }
        }
        debug!(axis, extent = current.dims()[axis], "axis bounded");
    }
}

// Candidate slabs of one box share split codes whatever the ratio, so every
// slab is tested as the root of its own hierarchy on cleared memos.
fn is_outside(cache: &mut EvaluationCache<'_>, slab: &SubdivBox, min_volume: f64) -> bool {
    cache.clear_memos();
    refine(cache, &slab.rooted(), min_volume, false) == Classification::Outside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Plane, Sphere};
    use crate::shape::ShapeArena;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_bounding_box_of_ball() {
        let mut arena = ShapeArena::new();
        let sphere = arena.add_surface(Sphere::new(Point3::new(1.0, -2.0, 0.5), 1.5));
        let ball = arena.complement_surface(sphere).unwrap();
        let mut cache = EvaluationCache::new(&arena, ball).unwrap();

        let mut bx =
            SubdivBox::axis_aligned(Point3::origin(), Vector3::new(20.0, 20.0, 20.0)).unwrap();
        let tol = 0.1;
        bounding_box(&mut cache, &mut bx, tol).unwrap();

        let (lower, upper) = bx.bounds();
        let expected_lower = [-0.5, -3.5, -1.0];
        let expected_upper = [2.5, -0.5, 2.0];
        for axis in 0..3 {
            assert!(lower[axis] <= expected_lower[axis] + 1e-9);
            assert!(lower[axis] >= expected_lower[axis] - tol);
            assert!(upper[axis] >= expected_upper[axis] - 1e-9);
            assert!(upper[axis] <= expected_upper[axis] + tol);
        }
    }

    #[test]
    fn test_bounding_box_rejects_bad_tolerance() {
        let mut arena = ShapeArena::new();
        let plane = arena.add_surface(Plane::new(Vector3::x(), 0.0));
        let half = arena.identity(plane).unwrap();
        let mut cache = EvaluationCache::new(&arena, half).unwrap();
        let mut bx = SubdivBox::global();
        assert!(bounding_box(&mut cache, &mut bx, -1.0).is_err());
        assert_eq!(bx, SubdivBox::global());
    }

    #[test]
    fn test_bounding_box_leaves_no_stale_memos() {
        let mut arena = ShapeArena::new();
        let sphere = arena.add_surface(Sphere::new(Point3::origin(), 1.0));
        let ball = arena.complement_surface(sphere).unwrap();
        let mut cache = EvaluationCache::new(&arena, ball).unwrap();

        let mut bx = SubdivBox::axis_aligned(Point3::origin(), Vector3::new(4.0, 4.0, 4.0)).unwrap();
        bounding_box(&mut cache, &mut bx, 0.05).unwrap();
        assert_eq!(cache.root().memo(), crate::eval::Memo::EMPTY);

        // The returned box is a root: a stale root memo would answer it wrongly
        let estimate = crate::eval::estimate_volume(&mut cache, &bx, 1e-3).unwrap();
        let exact = 4.0 / 3.0 * std::f64::consts::PI;
        assert!(estimate.volume > 0.0);
        assert!((estimate.volume - exact).abs() <= estimate.error_bound() + 1e-12);
    }
}
