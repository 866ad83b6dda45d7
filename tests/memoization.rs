// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Memo reuse, inheritance and reset across box queries

mod common;

use common::{calls, cube, CountingSurface};
use csg_cells::geometry::{Classification, Plane, SplitDirection, Sphere};
use csg_cells::{Kernel, ShapeArena, ShapeId};
use nalgebra::{Point3, Vector3};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

/// Quadrant `x >= 0, y >= 0` with counted planes
fn quadrant() -> (ShapeArena, ShapeId, [Arc<AtomicUsize>; 2]) {
    let mut arena = ShapeArena::new();
    let (px, cx) = CountingSurface::new(Plane::new(Vector3::x(), 0.0));
    let (py, cy) = CountingSurface::new(Plane::new(Vector3::y(), 0.0));
    let px = arena.add_surface(px);
    let py = arena.add_surface(py);
    let x = arena.identity(px).unwrap();
    let y = arena.identity(py).unwrap();
    let quadrant = arena.intersection(&[x, y]).unwrap();
    (arena, quadrant, [cx, cy])
}

fn total(counters: &[Arc<AtomicUsize>]) -> usize {
    counters.iter().map(calls).sum()
}

#[test]
fn test_repeated_box_uses_memo() {
    let mut arena = ShapeArena::new();
    let (sphere, counter) = CountingSurface::new(Sphere::new(Point3::origin(), 1.0));
    let sphere = arena.add_surface(sphere);
    let ball = arena.complement_surface(sphere).unwrap();
    let mut kernel = Kernel::new(&arena, ball).unwrap();

    let bx = cube(Point3::origin(), 4.0);
    assert_eq!(kernel.test_box(&bx), Classification::Ambiguous);
    assert_eq!(calls(&counter), 1);

    assert_eq!(kernel.test_box(&bx), Classification::Ambiguous);
    assert_eq!(calls(&counter), 1);
}

#[test]
fn test_resolved_result_is_inherited() {
    let (arena, shape, counters) = quadrant();
    let mut kernel = Kernel::new(&arena, shape).unwrap();

    let bx = cube(Point3::new(5.0, 5.0, 5.0), 2.0);
    assert_eq!(kernel.test_box(&bx), Classification::Inside);
    assert_eq!(total(&counters), 2);

    let (low, high) = bx.split(SplitDirection::Auto, 0.5);
    assert_eq!(kernel.test_box(&low), Classification::Inside);
    let (deeper, _) = high.split(SplitDirection::Axis(2), 0.25);
    assert_eq!(kernel.test_box(&deeper), Classification::Inside);
    assert_eq!(total(&counters), 2);
}

#[test]
fn test_ambiguous_result_is_recomputed() {
    let (arena, shape, counters) = quadrant();
    let mut kernel = Kernel::new(&arena, shape).unwrap();

    let bx = cube(Point3::origin(), 2.0);
    assert_eq!(kernel.test_box(&bx), Classification::Ambiguous);
    assert_eq!(total(&counters), 2);

    // Upper half along x: the x plane resolves, the y plane stays ambiguous
    let (_, high) = bx.split(SplitDirection::Axis(0), 0.5);
    assert_eq!(kernel.test_box(&high), Classification::Ambiguous);
    assert_eq!(total(&counters), 4);

    let (_, corner) = high.split(SplitDirection::Axis(1), 0.5);
    assert_eq!(kernel.test_box(&corner), Classification::Inside);
    // The x node inherits its resolved result from the previous box
    assert_eq!(calls(&counters[0]), 2);
    assert_eq!(calls(&counters[1]), 3);
}

#[test]
fn test_reset_forces_recomputation() {
    let (arena, shape, counters) = quadrant();
    let mut kernel = Kernel::new(&arena, shape).unwrap();

    let bx = cube(Point3::new(5.0, 5.0, 5.0), 2.0);
    kernel.test_box(&bx);
    kernel.test_box(&bx);
    assert_eq!(total(&counters), 2);

    kernel.reset_cache();
    assert_eq!(kernel.test_box(&bx), Classification::Inside);
    assert_eq!(total(&counters), 4);

    kernel.reset_stat();
    assert_eq!(kernel.test_box(&bx), Classification::Inside);
    assert_eq!(total(&counters), 6);
}

#[test]
fn test_detached_boxes_never_hit_the_memo() {
    let (arena, shape, counters) = quadrant();
    let mut kernel = Kernel::new(&arena, shape).unwrap();

    let bx = cube(Point3::new(5.0, 5.0, 5.0), 2.0).detached();
    kernel.test_box(&bx);
    kernel.test_box(&bx);
    assert_eq!(total(&counters), 4);
}

#[test]
fn test_refinement_reuses_resolved_ancestors() {
    let (arena, shape, counters) = quadrant();
    let mut kernel = Kernel::new(&arena, shape).unwrap();

    let bx = cube(Point3::new(5.0, 5.0, 5.0), 2.0);
    assert_eq!(kernel.ultimate_test_box(&bx).unwrap(), Classification::Inside);
    let first = total(&counters);
    assert_eq!(kernel.ultimate_test_box(&bx).unwrap(), Classification::Inside);
    assert_eq!(total(&counters), first);
}
