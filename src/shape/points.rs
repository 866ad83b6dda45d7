// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch point classification

use super::arena::ShapeArena;
use super::node::{Operation, ShapeId, ShapePayload};
use crate::error::ShapeError;
use crate::geometry::Classification;
use nalgebra::Point3;

/// Classify every point against a shape.
///
/// Each returned value is `Inside` or `Outside`; points carry no ambiguity.
pub fn test_points(
    arena: &ShapeArena,
    shape: ShapeId,
    points: &[Point3<f64>],
) -> Result<Vec<Classification>, ShapeError> {
    let mut out = allocate(points.len())?;
    test_points_into(arena, shape, points, &mut out)?;
    Ok(out)
}

/// Classify points into a caller-provided buffer of the same length
pub fn test_points_into(
    arena: &ShapeArena,
    shape: ShapeId,
    points: &[Point3<f64>],
    out: &mut [Classification],
) -> Result<(), ShapeError> {
    if out.len() != points.len() {
        return Err(ShapeError::WrongArgLength {
            expected: points.len(),
            found: out.len(),
        });
    }
    classify_into(arena, shape, points, out)
}

fn classify_into(
    arena: &ShapeArena,
    shape: ShapeId,
    points: &[Point3<f64>],
    out: &mut [Classification],
) -> Result<(), ShapeError> {
    let node = arena.shape(shape)?;
    if let Some(value) = node.op().constant() {
        out.fill(value);
        return Ok(());
    }
    match node.payload() {
        ShapePayload::Surface(id) => {
            arena.surface(*id)?.classify_points(points, out);
            if node.op() == Operation::Complement {
                out.iter_mut().for_each(|value| *value = value.complement());
            }
            Ok(())
        }
        ShapePayload::Children(children) => {
            let combinator = node
                .op()
                .combinator()
                .ok_or_else(|| ShapeError::invalid("composite node without combinator"))?;
            let n = points.len();
            let total = children
                .len()
                .checked_mul(n)
                .ok_or(ShapeError::NoMemory { requested: usize::MAX })?;
            let mut scratch = allocate(total)?;
            for (child, rows) in children.iter().zip(scratch.chunks_mut(n.max(1))) {
                classify_into(arena, *child, points, rows)?;
            }
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = combinator.apply(scratch.iter().skip(i).step_by(n).copied());
            }
            Ok(())
        }
        ShapePayload::Void => Err(ShapeError::invalid("void payload on a non-constant node")),
    }
}

fn allocate(len: usize) -> Result<Vec<Classification>, ShapeError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| ShapeError::NoMemory { requested: len })?;
    buffer.resize(len, Classification::Ambiguous);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Plane, Sphere};
    use nalgebra::Vector3;

    #[test]
    fn test_points_sphere_and_slab() {
        let mut arena = ShapeArena::new();
        let sphere = arena.add_surface(Sphere::new(Point3::origin(), 1.0));
        let plane = arena.add_surface(Plane::new(Vector3::x(), 0.0));
        let ball = arena.complement_surface(sphere).unwrap();
        let right = arena.identity(plane).unwrap();
        let half_ball = arena.intersection(&[ball, right]).unwrap();

        let points = [
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(-0.5, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let result = test_points(&arena, half_ball, &points).unwrap();
        assert_eq!(
            result,
            vec![Classification::Inside, Classification::Outside, Classification::Outside]
        );
    }

    #[test]
    fn test_points_constants() {
        let mut arena = ShapeArena::new();
        let universe = arena.universe();
        let points = [Point3::origin(); 4];
        let result = test_points(&arena, universe, &points).unwrap();
        assert!(result.iter().all(|c| *c == Classification::Inside));
        assert!(test_points(&arena, universe, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_points_wrong_length() {
        let mut arena = ShapeArena::new();
        let empty = arena.empty();
        let mut out = [Classification::Ambiguous; 2];
        let err = test_points_into(&arena, empty, &[Point3::origin()], &mut out).unwrap_err();
        assert!(matches!(
            err,
            ShapeError::WrongArgLength { expected: 1, found: 2 }
        ));
    }
}
