// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Property-based tests for the classification algebra and point queries

mod common;

use common::{ball, half_space};
use csg_cells::geometry::classification::{intersection, union};
use csg_cells::shape::test_points_into;
use csg_cells::{Classification, Kernel, ShapeArena, ShapeError, ShapeId, Status};
use nalgebra::{Point3, Vector3};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_classification() -> impl Strategy<Value = Classification> {
    prop_oneof![
        Just(Classification::Outside),
        Just(Classification::Ambiguous),
        Just(Classification::Inside),
    ]
}

fn arb_values() -> impl Strategy<Value = Vec<Classification>> {
    prop::collection::vec(arb_classification(), 0..8)
}

fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    (-2.0f64..2.0, -2.0f64..2.0, -2.0f64..2.0).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

struct Scene {
    arena: ShapeArena,
    a: ShapeId,
    b: ShapeId,
}

/// Two overlapping balls
fn scene() -> Scene {
    let mut arena = ShapeArena::new();
    let a = ball(&mut arena, Point3::new(-0.4, 0.0, 0.0), 1.0);
    let b = ball(&mut arena, Point3::new(0.6, 0.3, 0.0), 0.8);
    Scene { arena, a, b }
}

fn classify(arena: &ShapeArena, shape: ShapeId, point: Point3<f64>) -> Classification {
    Kernel::new(arena, shape).unwrap().test_points(&[point]).unwrap()[0]
}

// ---------------------------------------------------------------------------
// Classification algebra
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn intersection_is_dual_of_union(values in arb_values()) {
        let dual = union(values.iter().map(|v| v.complement())).complement();
        prop_assert_eq!(intersection(values.iter().copied()), dual);
    }

    #[test]
    fn intersection_is_the_minimum(values in arb_values()) {
        let expected = values.iter().copied().min().unwrap_or(Classification::Inside);
        prop_assert_eq!(intersection(values.iter().copied()), expected);
    }

    #[test]
    fn union_is_the_maximum(values in arb_values()) {
        let expected = values.iter().copied().max().unwrap_or(Classification::Outside);
        prop_assert_eq!(union(values.iter().copied()), expected);
    }

    #[test]
    fn combination_ignores_order(mut values in arb_values()) {
        let forward = (intersection(values.iter().copied()), union(values.iter().copied()));
        values.reverse();
        let backward = (intersection(values.iter().copied()), union(values.iter().copied()));
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn complement_is_an_involution(value in arb_classification()) {
        prop_assert_eq!(value.complement().complement(), value);
        prop_assert_eq!(value.complement().as_i8(), -value.as_i8());
    }
}

// ---------------------------------------------------------------------------
// Point classification follows the set operations
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn points_follow_set_operations(point in arb_point()) {
        let Scene { mut arena, a, b } = scene();
        let both = arena.intersection(&[a, b]).unwrap();
        let either = arena.union(&[a, b]).unwrap();
        let outside_a = arena.complement(a).unwrap();

        let in_a = classify(&arena, a, point) == Classification::Inside;
        let in_b = classify(&arena, b, point) == Classification::Inside;
        prop_assert_eq!(classify(&arena, both, point) == Classification::Inside, in_a && in_b);
        prop_assert_eq!(classify(&arena, either, point) == Classification::Inside, in_a || in_b);
        prop_assert_eq!(classify(&arena, outside_a, point) == Classification::Inside, !in_a);
    }

    #[test]
    fn points_are_never_ambiguous(points in prop::collection::vec(arb_point(), 0..64)) {
        let Scene { mut arena, a, b } = scene();
        let shape = arena.union(&[a, b]).unwrap();
        let results = Kernel::new(&arena, shape).unwrap().test_points(&points).unwrap();
        prop_assert_eq!(results.len(), points.len());
        prop_assert!(results.iter().all(|value| value.is_resolved()));
    }
}

#[test]
fn test_points_on_surface_count_as_positive_sense() {
    let mut arena = ShapeArena::new();
    let above = half_space(&mut arena, Vector3::z(), 0.0);
    let below = arena.complement(above).unwrap();
    let on_plane = [Point3::new(3.0, -2.0, 0.0)];

    let kernel = Kernel::new(&arena, above).unwrap();
    assert_eq!(kernel.test_points(&on_plane).unwrap(), vec![Classification::Inside]);
    let kernel = Kernel::new(&arena, below).unwrap();
    assert_eq!(kernel.test_points(&on_plane).unwrap(), vec![Classification::Outside]);
}

#[test]
fn test_constant_shapes_fill_points() {
    let mut arena = ShapeArena::new();
    let universe = arena.universe();
    let empty = arena.empty();
    let points = vec![Point3::new(1e6, 0.0, 0.0); 5];
    assert_eq!(
        Kernel::new(&arena, universe).unwrap().test_points(&points).unwrap(),
        vec![Classification::Inside; 5]
    );
    assert_eq!(
        Kernel::new(&arena, empty).unwrap().test_points(&points).unwrap(),
        vec![Classification::Outside; 5]
    );
}

#[test]
fn test_points_into_checks_output_length() {
    let Scene { arena, a, .. } = scene();
    let points = [Point3::origin(), Point3::new(5.0, 0.0, 0.0)];
    let mut out = [Classification::Ambiguous; 3];
    let result = test_points_into(&arena, a, &points, &mut out);
    assert!(matches!(
        result,
        Err(ShapeError::WrongArgLength {
            expected: 2,
            found: 3
        })
    ));
    assert_eq!(Status::from_result(&result), Status::WrongArgLength);
    assert_eq!(Status::WrongArgLength.code(), -3);

    let mut out = [Classification::Ambiguous; 2];
    test_points_into(&arena, a, &points, &mut out).unwrap();
    assert_eq!(out, [Classification::Inside, Classification::Outside]);
}

#[test]
fn test_empty_point_batch() {
    let Scene { arena, a, .. } = scene();
    let results = Kernel::new(&arena, a).unwrap().test_points(&[]).unwrap();
    assert!(results.is_empty());
}
