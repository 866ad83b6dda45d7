// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shape node definitions

use crate::error::ShapeError;
use crate::geometry::classification::{self, Classification};
use serde::{Deserialize, Serialize};
use std::fmt;

slotmap::new_key_type! {
    /// Handle of a shape registered in a [`ShapeArena`](super::ShapeArena)
    pub struct ShapeId;
    /// Handle of a surface registered in a [`ShapeArena`](super::ShapeArena)
    pub struct SurfaceId;
}

/// Operation applied by a shape node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Intersection,
    Complement,
    Empty,
    Union,
    Identity,
    Universe,
}

impl Operation {
    /// Leaf operation over one surface
    pub fn is_final(self) -> bool {
        matches!(self, Operation::Identity | Operation::Complement)
    }

    /// Constant operation without arguments
    pub fn is_void(self) -> bool {
        matches!(self, Operation::Empty | Operation::Universe)
    }

    pub fn is_composite(self) -> bool {
        matches!(self, Operation::Intersection | Operation::Union)
    }

    /// Operation describing the complement of a shape built with `self`
    pub fn inverse(self) -> Self {
        match self {
            Operation::Intersection => Operation::Union,
            Operation::Union => Operation::Intersection,
            Operation::Complement => Operation::Identity,
            Operation::Identity => Operation::Complement,
            Operation::Empty => Operation::Universe,
            Operation::Universe => Operation::Empty,
        }
    }

    /// Combinator for composite operations
    pub fn combinator(self) -> Option<Combinator> {
        match self {
            Operation::Intersection => Some(Combinator::Intersection),
            Operation::Union => Some(Combinator::Union),
            _ => None,
        }
    }

    /// Constant classification of void operations
    pub fn constant(self) -> Option<Classification> {
        match self {
            Operation::Universe => Some(Classification::Inside),
            Operation::Empty => Some(Classification::Outside),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operation::Intersection => 'I',
            Operation::Complement => 'C',
            Operation::Empty => 'E',
            Operation::Union => 'U',
            Operation::Identity => 'S',
            Operation::Universe => 'R',
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Boolean combination applied by composite nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Intersection,
    Union,
}

impl Combinator {
    pub fn apply<I>(self, values: I) -> Classification
    where
        I: IntoIterator<Item = Classification>,
    {
        match self {
            Combinator::Intersection => classification::intersection(values),
            Combinator::Union => classification::union(values),
        }
    }

    pub fn operation(self) -> Operation {
        match self {
            Combinator::Intersection => Operation::Intersection,
            Combinator::Union => Operation::Union,
        }
    }

    /// Value that decides the combination on its own
    pub fn dominant(self) -> Classification {
        match self {
            Combinator::Intersection => Classification::Outside,
            Combinator::Union => Classification::Inside,
        }
    }
}

/// Arguments of a shape node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapePayload {
    /// Surface of a final node
    Surface(SurfaceId),
    /// Ordered children of a composite node
    Children(Vec<ShapeId>),
    /// No arguments (void nodes)
    Void,
}

/// Immutable CSG node.
///
/// Children and surfaces are referenced by handle; the node owns only the
/// list of child handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    op: Operation,
    payload: ShapePayload,
}

impl Shape {
    /// Check that the payload fits the operation.
    ///
    /// Void operations drop whatever payload is passed.
    pub(crate) fn new(op: Operation, payload: ShapePayload) -> Result<Self, ShapeError> {
        if op.is_void() {
            return Ok(Self {
                op,
                payload: ShapePayload::Void,
            });
        }
        match (&payload, op.is_final()) {
            (ShapePayload::Surface(_), true) => {}
            (_, true) => {
                return Err(ShapeError::invalid(format!(
                    "{op:?} needs exactly one surface argument"
                )))
            }
            (ShapePayload::Children(children), false) if children.is_empty() => {
                return Err(ShapeError::invalid(format!("{op:?} needs at least one child")))
            }
            (ShapePayload::Children(_), false) => {}
            (_, false) => {
                return Err(ShapeError::invalid(format!("{op:?} needs child shapes")))
            }
        }
        Ok(Self { op, payload })
    }

    pub(crate) fn constant(universe: bool) -> Self {
        let op = if universe {
            Operation::Universe
        } else {
            Operation::Empty
        };
        Self {
            op,
            payload: ShapePayload::Void,
        }
    }

    pub fn op(&self) -> Operation {
        self.op
    }

    pub fn payload(&self) -> &ShapePayload {
        &self.payload
    }

    /// Number of arguments
    pub fn arity(&self) -> usize {
        match &self.payload {
            ShapePayload::Surface(_) => 1,
            ShapePayload::Children(children) => children.len(),
            ShapePayload::Void => 0,
        }
    }

    pub fn children(&self) -> &[ShapeId] {
        match &self.payload {
            ShapePayload::Children(children) => children,
            _ => &[],
        }
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        match self.payload {
            ShapePayload::Surface(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn surface_id() -> SurfaceId {
        SurfaceId::from(KeyData::from_ffi(1))
    }

    #[test]
    fn test_operation_kinds() {
        assert!(Operation::Identity.is_final());
        assert!(Operation::Complement.is_final());
        assert!(Operation::Empty.is_void());
        assert!(Operation::Union.is_composite());
        for op in [
            Operation::Intersection,
            Operation::Complement,
            Operation::Empty,
            Operation::Union,
            Operation::Identity,
            Operation::Universe,
        ] {
            assert_eq!(op.inverse().inverse(), op);
        }
    }

    #[test]
    fn test_shape_validation() {
        assert!(Shape::new(Operation::Identity, ShapePayload::Surface(surface_id())).is_ok());
        assert!(Shape::new(Operation::Complement, ShapePayload::Void).is_err());
        assert!(Shape::new(Operation::Union, ShapePayload::Children(vec![])).is_err());
        assert!(Shape::new(Operation::Intersection, ShapePayload::Surface(surface_id())).is_err());

        let universe = Shape::new(Operation::Universe, ShapePayload::Surface(surface_id())).unwrap();
        assert_eq!(universe.payload(), &ShapePayload::Void);
        assert_eq!(universe.arity(), 0);
    }

    #[test]
    fn test_combinator() {
        use Classification::*;
        let union = Operation::Union.combinator().unwrap();
        assert_eq!(union.apply([Outside, Inside]), Inside);
        assert_eq!(union.dominant(), Inside);
        assert!(Operation::Identity.combinator().is_none());
    }
}
