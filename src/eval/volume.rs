// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Volume estimation by recursive box splitting

use super::cache::EvaluationCache;
use super::classify::{check_positive, test_box};
use crate::error::ShapeError;
use crate::geometry::{Classification, SplitDirection, SubdivBox};
use serde::{Deserialize, Serialize};

/// Volume of a shape within a box.
///
/// Boxes still ambiguous at the resolution floor count for half their
/// volume; `unresolved` is the total volume of those boxes, so the error of
/// `volume` never exceeds `unresolved / 2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeEstimate {
    pub volume: f64,
    pub unresolved: f64,
}

impl VolumeEstimate {
    pub fn error_bound(&self) -> f64 {
        0.5 * self.unresolved
    }
}

impl std::ops::Add for VolumeEstimate {
    type Output = VolumeEstimate;

    fn add(self, other: Self) -> Self {
        VolumeEstimate {
            volume: self.volume + other.volume,
            unresolved: self.unresolved + other.unresolved,
        }
    }
}

/// Estimate the volume of the shape inside `bx`
pub fn volume(
    cache: &mut EvaluationCache<'_>,
    bx: &SubdivBox,
    min_volume: f64,
) -> Result<f64, ShapeError> {
    Ok(estimate_volume(cache, bx, min_volume)?.volume)
}

/// Estimate the volume together with the volume left unresolved
pub fn estimate_volume(
    cache: &mut EvaluationCache<'_>,
    bx: &SubdivBox,
    min_volume: f64,
) -> Result<VolumeEstimate, ShapeError> {
    check_positive("min_volume", min_volume)?;
    Ok(integrate(cache, bx, min_volume))
}

fn integrate(cache: &mut EvaluationCache<'_>, bx: &SubdivBox, min_volume: f64) -> VolumeEstimate {
    match test_box(cache, bx, false) {
        Classification::Inside => VolumeEstimate {
            volume: bx.volume(),
            unresolved: 0.0,
        },
        Classification::Outside => VolumeEstimate::default(),
        Classification::Ambiguous if bx.volume() > min_volume => {
            let (low, high) = bx.split(SplitDirection::Auto, 0.5);
            integrate(cache, &low, min_volume) + integrate(cache, &high, min_volume)
        }
        Classification::Ambiguous => VolumeEstimate {
            volume: 0.5 * bx.volume(),
            unresolved: bx.volume(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Plane, Sphere};
    use crate::shape::ShapeArena;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    fn cube(size: f64) -> SubdivBox {
        SubdivBox::axis_aligned(Point3::origin(), Vector3::new(size, size, size)).unwrap()
    }

    #[test]
    fn test_volume_constants_are_exact() {
        let mut arena = ShapeArena::new();
        let universe = arena.universe();
        let empty = arena.empty();
        let bx = cube(3.0);
        let mut cache = EvaluationCache::new(&arena, universe).unwrap();
        assert_eq!(volume(&mut cache, &bx, 0.1).unwrap(), bx.volume());
        let mut cache = EvaluationCache::new(&arena, empty).unwrap();
        assert_eq!(volume(&mut cache, &bx, 0.1).unwrap(), 0.0);
    }

    #[test]
    fn test_volume_half_space() {
        let mut arena = ShapeArena::new();
        let plane = arena.add_surface(Plane::new(Vector3::x(), 0.0));
        let right = arena.identity(plane).unwrap();
        let mut cache = EvaluationCache::new(&arena, right).unwrap();
        let estimate = estimate_volume(&mut cache, &cube(2.0), 1e-3).unwrap();
        assert_relative_eq!(estimate.volume, 4.0, epsilon = estimate.error_bound() + 1e-12);
        assert!(estimate.unresolved < 0.5);
    }

    #[test]
    fn test_volume_ball_within_error_bound() {
        let mut arena = ShapeArena::new();
        let sphere = arena.add_surface(Sphere::new(Point3::origin(), 1.0));
        let ball = arena.complement_surface(sphere).unwrap();
        let mut cache = EvaluationCache::new(&arena, ball).unwrap();
        let estimate = estimate_volume(&mut cache, &cube(2.5), 1e-3).unwrap();
        let exact = 4.0 / 3.0 * std::f64::consts::PI;
        assert!((estimate.volume - exact).abs() <= estimate.error_bound() + 1e-12);
        assert!(estimate.unresolved > 0.0);
    }

    #[test]
    fn test_volume_floor_counts_half() {
        let mut arena = ShapeArena::new();
        let plane = arena.add_surface(Plane::new(Vector3::x(), -0.3));
        let right = arena.identity(plane).unwrap();
        let mut cache = EvaluationCache::new(&arena, right).unwrap();
        let bx = cube(1.0);
        let estimate = estimate_volume(&mut cache, &bx, 2.0).unwrap();
        assert_eq!(estimate.volume, 0.5);
        assert_eq!(estimate.unresolved, 1.0);
    }
}
