// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shared helpers for integration tests

#![allow(dead_code)]

use csg_cells::geometry::{Classification, Plane, Sphere, SubdivBox, Surface};
use csg_cells::{ShapeArena, ShapeId};
use nalgebra::{Point3, Vector3};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Surface wrapper counting box classifications
#[derive(Debug)]
pub struct CountingSurface<S> {
    inner: S,
    calls: Arc<AtomicUsize>,
}

impl<S: Surface> CountingSurface<S> {
    pub fn new(inner: S) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl<S: Surface> Surface for CountingSurface<S> {
    fn classify_box(&self, bx: &SubdivBox) -> Classification {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.classify_box(bx)
    }

    fn classify_points(&self, points: &[Point3<f64>], out: &mut [Classification]) {
        self.inner.classify_points(points, out)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

pub fn cube(center: Point3<f64>, size: f64) -> SubdivBox {
    SubdivBox::axis_aligned(center, Vector3::new(size, size, size)).unwrap()
}

/// Solid ball, the negative sense of a sphere
pub fn ball(arena: &mut ShapeArena, center: Point3<f64>, radius: f64) -> ShapeId {
    let sphere = arena.add_surface(Sphere::new(center, radius));
    arena.complement_surface(sphere).unwrap()
}

/// Half-space `normal . x + offset >= 0`
pub fn half_space(arena: &mut ShapeArena, normal: Vector3<f64>, offset: f64) -> ShapeId {
    let plane = arena.add_surface(Plane::new(normal, offset));
    arena.identity(plane).unwrap()
}

/// Axis-aligned cube `[-half, half]^3` as an intersection of six half-spaces
pub fn planar_cube(arena: &mut ShapeArena, half: f64) -> ShapeId {
    let faces: Vec<ShapeId> = [Vector3::x(), Vector3::y(), Vector3::z()]
        .into_iter()
        .flat_map(|axis| [axis, -axis])
        .map(|normal| half_space(arena, normal, half))
        .collect();
    arena.intersection(&faces).unwrap()
}
