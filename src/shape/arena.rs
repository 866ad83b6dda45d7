// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Arena owning surfaces and shape nodes

use super::node::{Combinator, Operation, Shape, ShapeId, ShapePayload, SurfaceId};
use crate::error::ShapeError;
use crate::geometry::Surface;
use slotmap::SlotMap;
use tracing::debug;

/// Token of a shape written in reverse Polish notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolishToken {
    /// Positive sense of a surface
    Surface(SurfaceId),
    /// Complement of the top operand
    Complement,
    /// Intersection of the two top operands
    Intersection,
    /// Union of the two top operands
    Union,
}

/// Registry of surfaces and shapes.
///
/// Shapes reference children and surfaces by handle, so one sub-shape can be
/// shared by many parents and many trees. A shape can only reference handles
/// that already exist, which keeps every shape graph acyclic.
#[derive(Debug, Default)]
pub struct ShapeArena {
    surfaces: SlotMap<SurfaceId, Box<dyn Surface>>,
    shapes: SlotMap<ShapeId, Shape>,
}

impl ShapeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_surface(&mut self, surface: impl Surface + 'static) -> SurfaceId {
        self.add_boxed_surface(Box::new(surface))
    }

    pub fn add_boxed_surface(&mut self, surface: Box<dyn Surface>) -> SurfaceId {
        let kind = surface.name().to_string();
        let id = self.surfaces.insert(surface);
        debug!(?id, kind = %kind, "surface registered");
        id
    }

    pub fn surface(&self, id: SurfaceId) -> Result<&dyn Surface, ShapeError> {
        self.surfaces
            .get(id)
            .map(|surface| surface.as_ref())
            .ok_or(ShapeError::UnknownSurface)
    }

    pub fn shape(&self, id: ShapeId) -> Result<&Shape, ShapeError> {
        self.shapes.get(id).ok_or(ShapeError::UnknownShape)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Register a shape node exactly as given.
    ///
    /// Rejects final nodes without a registered surface and composite nodes
    /// without children or with unregistered children.
    pub fn add_shape(&mut self, op: Operation, payload: ShapePayload) -> Result<ShapeId, ShapeError> {
        let shape = Shape::new(op, payload)?;
        match shape.payload() {
            ShapePayload::Surface(id) if !self.surfaces.contains_key(*id) => {
                return Err(ShapeError::UnknownSurface)
            }
            ShapePayload::Children(children)
                if children.iter().any(|child| !self.shapes.contains_key(*child)) =>
            {
                return Err(ShapeError::UnknownShape)
            }
            _ => {}
        }
        Ok(self.shapes.insert(shape))
    }

    /// Remove a shape that no other shape references
    pub fn remove_shape(&mut self, id: ShapeId) -> Result<Shape, ShapeError> {
        if !self.shapes.contains_key(id) {
            return Err(ShapeError::UnknownShape);
        }
        if self.shapes.values().any(|shape| shape.children().contains(&id)) {
            return Err(ShapeError::invalid("shape is still referenced by another shape"));
        }
        self.shapes.remove(id).ok_or(ShapeError::UnknownShape)
    }

    pub fn empty(&mut self) -> ShapeId {
        self.shapes.insert(Shape::constant(false))
    }

    pub fn universe(&mut self) -> ShapeId {
        self.shapes.insert(Shape::constant(true))
    }

    /// Positive sense of a surface
    pub fn identity(&mut self, surface: SurfaceId) -> Result<ShapeId, ShapeError> {
        self.add_shape(Operation::Identity, ShapePayload::Surface(surface))
    }

    /// Negative sense of a surface
    pub fn complement_surface(&mut self, surface: SurfaceId) -> Result<ShapeId, ShapeError> {
        self.add_shape(Operation::Complement, ShapePayload::Surface(surface))
    }

    /// Complement of a shape, pushed down to the surfaces
    pub fn complement(&mut self, id: ShapeId) -> Result<ShapeId, ShapeError> {
        let shape = self.shape(id)?.clone();
        match shape.payload() {
            ShapePayload::Void => Ok(self.shapes.insert(Shape::constant(
                shape.op().inverse() == Operation::Universe,
            ))),
            ShapePayload::Surface(surface) => {
                self.add_shape(shape.op().inverse(), ShapePayload::Surface(*surface))
            }
            ShapePayload::Children(children) => {
                let complemented = children
                    .iter()
                    .map(|child| self.complement(*child))
                    .collect::<Result<Vec<_>, _>>()?;
                match shape.op().inverse() {
                    Operation::Union => self.union(&complemented),
                    _ => self.intersection(&complemented),
                }
            }
        }
    }

    /// Normalized intersection of shapes
    pub fn intersection(&mut self, args: &[ShapeId]) -> Result<ShapeId, ShapeError> {
        self.combine(Combinator::Intersection, args)
    }

    /// Normalized union of shapes
    pub fn union(&mut self, args: &[ShapeId]) -> Result<ShapeId, ShapeError> {
        self.combine(Combinator::Union, args)
    }

    /// Build a composite shape after simplifying its arguments.
    ///
    /// Nested nodes of the same operation are flattened, neutral constants are
    /// dropped, absorbing constants and complementary pairs collapse the whole
    /// node, and structurally equal arguments are kept once.
    fn combine(&mut self, combinator: Combinator, args: &[ShapeId]) -> Result<ShapeId, ShapeError> {
        if args.is_empty() {
            return Err(ShapeError::invalid(format!(
                "{:?} needs at least one argument",
                combinator.operation()
            )));
        }
        let op = combinator.operation();
        // Union is absorbed by the universe, intersection by the empty set
        let absorbed_by_universe = combinator == Combinator::Union;
        let absorbing = Shape::constant(absorbed_by_universe).op();

        let mut pending: Vec<ShapeId> = args.iter().rev().copied().collect();
        let mut kept: Vec<ShapeId> = Vec::with_capacity(args.len());
        while let Some(id) = pending.pop() {
            let shape = self.shape(id)?;
            if shape.op() == op {
                pending.extend(shape.children().iter().rev().copied());
                continue;
            }
            if shape.op() == absorbing {
                debug!(?op, "argument absorbs the combination");
                return Ok(self.shapes.insert(Shape::constant(absorbed_by_universe)));
            }
            if shape.op() == absorbing.inverse() {
                continue;
            }
            if kept.iter().any(|other| self.same_shape(*other, id)) {
                continue;
            }
            if kept.iter().any(|other| self.is_complement(*other, id)) {
                debug!(?op, "complementary arguments collapse the combination");
                return Ok(self.shapes.insert(Shape::constant(absorbed_by_universe)));
            }
            kept.push(id);
        }

        match kept.len() {
            0 => Ok(self.shapes.insert(Shape::constant(!absorbed_by_universe))),
            1 => Ok(kept[0]),
            _ => self.add_shape(op, ShapePayload::Children(kept)),
        }
    }

    /// Structural equality of two shapes
    pub fn same_shape(&self, a: ShapeId, b: ShapeId) -> bool {
        if a == b {
            return true;
        }
        let (Some(sa), Some(sb)) = (self.shapes.get(a), self.shapes.get(b)) else {
            return false;
        };
        if sa.op() != sb.op() || sa.arity() != sb.arity() {
            return false;
        }
        match (sa.payload(), sb.payload()) {
            (ShapePayload::Void, ShapePayload::Void) => true,
            (ShapePayload::Surface(x), ShapePayload::Surface(y)) => x == y,
            (ShapePayload::Children(xs), ShapePayload::Children(ys)) => {
                xs.iter().zip(ys).all(|(x, y)| self.same_shape(*x, *y))
            }
            _ => false,
        }
    }

    /// Whether `b` describes exactly the complement of `a`
    pub fn is_complement(&self, a: ShapeId, b: ShapeId) -> bool {
        let (Some(sa), Some(sb)) = (self.shapes.get(a), self.shapes.get(b)) else {
            return false;
        };
        if sa.op() != sb.op().inverse() || sa.arity() != sb.arity() {
            return false;
        }
        match (sa.payload(), sb.payload()) {
            (ShapePayload::Void, ShapePayload::Void) => true,
            (ShapePayload::Surface(x), ShapePayload::Surface(y)) => x == y,
            (ShapePayload::Children(xs), ShapePayload::Children(ys)) => xs
                .iter()
                .all(|x| ys.iter().any(|y| self.is_complement(*x, *y))),
            _ => false,
        }
    }

    /// Build a shape from reverse Polish notation
    pub fn from_polish(&mut self, tokens: &[PolishToken]) -> Result<ShapeId, ShapeError> {
        let underflow = || ShapeError::invalid("polish expression is missing operands");
        let mut operands: Vec<ShapeId> = Vec::new();
        for token in tokens {
            let next = match token {
                PolishToken::Surface(surface) => self.identity(*surface)?,
                PolishToken::Complement => {
                    let arg = operands.pop().ok_or_else(underflow)?;
                    self.complement(arg)?
                }
                PolishToken::Intersection | PolishToken::Union => {
                    let first = operands.pop().ok_or_else(underflow)?;
                    let second = operands.pop().ok_or_else(underflow)?;
                    if *token == PolishToken::Intersection {
                        self.intersection(&[second, first])?
                    } else {
                        self.union(&[second, first])?
                    }
                }
            };
            operands.push(next);
        }
        match (operands.pop(), operands.is_empty()) {
            (Some(root), true) => Ok(root),
            (None, _) => Err(ShapeError::invalid("polish expression is empty")),
            (Some(_), false) => Err(ShapeError::invalid(
                "polish expression leaves unused operands",
            )),
        }
    }
}
