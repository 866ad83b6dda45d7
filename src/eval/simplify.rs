// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Simplest equivalent shapes from collected statistics
//!
//! A composite node only needs the children of one of its coverages to
//! reproduce every box it classified. Candidates are built from each
//! coverage and the simplified variants of the covering children, then
//! ranked by the number of surface senses they test.

use super::cache::{CacheKind, CacheNode};
use super::coverage::find_coverages;
use crate::error::ShapeError;
use crate::geometry::Classification;
use crate::shape::{Combinator, ShapeArena, ShapeId, SurfaceId};
use std::collections::{BTreeMap, BTreeSet};

/// Shape candidate produced by simplification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Simplified {
    Constant(Classification),
    /// Surface sense; `negate` selects the side below zero
    Final { surface: SurfaceId, negate: bool },
    Composite {
        combinator: Combinator,
        children: Vec<Simplified>,
    },
}

impl Simplified {
    /// The cached subtree as it is
    pub fn from_node(node: &CacheNode<'_>) -> Self {
        match node.kind() {
            CacheKind::Constant(value) => Simplified::Constant(*value),
            CacheKind::Final {
                surface_id, negate, ..
            } => Simplified::Final {
                surface: *surface_id,
                negate: *negate,
            },
            CacheKind::Composite {
                combinator,
                children,
            } => Simplified::combine(*combinator, children.iter().map(Self::from_node).collect()),
        }
    }

    /// Combine children, absorbing constants. A single child stands for the
    /// combination itself.
    pub fn combine(combinator: Combinator, children: Vec<Simplified>) -> Self {
        let dominant = combinator.dominant();
        let mut kept = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Simplified::Constant(value) if value == dominant => {
                    return Simplified::Constant(dominant)
                }
                Simplified::Constant(_) => {}
                child => kept.push(child),
            }
        }
        match kept.len() {
            0 => Simplified::Constant(dominant.complement()),
            1 => kept.remove(0),
            _ => Simplified::Composite {
                combinator,
                children: kept,
            },
        }
    }

    /// Number of surface senses tested
    pub fn complexity(&self) -> usize {
        match self {
            Simplified::Constant(_) => 0,
            Simplified::Final { .. } => 1,
            Simplified::Composite { children, .. } => {
                children.iter().map(Simplified::complexity).sum()
            }
        }
    }

    pub fn surfaces(&self) -> BTreeSet<SurfaceId> {
        match self {
            Simplified::Constant(_) => BTreeSet::new(),
            Simplified::Final { surface, .. } => BTreeSet::from([*surface]),
            Simplified::Composite { children, .. } => {
                children.iter().flat_map(Simplified::surfaces).collect()
            }
        }
    }

    /// Register the candidate in `arena` through the normalising builders
    pub fn build(&self, arena: &mut ShapeArena) -> Result<ShapeId, ShapeError> {
        match self {
            Simplified::Constant(Classification::Inside) => Ok(arena.universe()),
            Simplified::Constant(Classification::Outside) => Ok(arena.empty()),
            Simplified::Constant(Classification::Ambiguous) => {
                Err(ShapeError::invalid("a shape cannot be constantly ambiguous"))
            }
            Simplified::Final { surface, negate } => {
                if *negate {
                    arena.complement_surface(*surface)
                } else {
                    arena.identity(*surface)
                }
            }
            Simplified::Composite {
                combinator,
                children,
            } => {
                let args = children
                    .iter()
                    .map(|child| child.build(arena))
                    .collect::<Result<Vec<_>, _>>()?;
                match combinator {
                    Combinator::Intersection => arena.intersection(&args),
                    Combinator::Union => arena.union(&args),
                }
            }
        }
    }
}

/// Simplest shapes equivalent to `node` over the boxes its statistics cover.
///
/// Candidates are sorted by complexity; those more complex than the simplest
/// one by over `trim_size` are dropped. A node without statistics comes back
/// unchanged.
pub fn simplest(node: &CacheNode<'_>, trim_size: usize) -> Vec<Simplified> {
    let (
        CacheKind::Composite {
            combinator,
            children,
        },
        Some(table),
    ) = (node.kind(), node.stat_table())
    else {
        return vec![Simplified::from_node(node)];
    };
    if table.nrows == 0 {
        return vec![Simplified::from_node(node)];
    }

    let dominant = combinator.dominant();
    let target = dominant.as_i8();
    if table.rows().all(|row| row.contains(&target)) {
        return vec![Simplified::Constant(dominant)];
    }

    let covers = find_coverages(&table, dominant);
    let used: BTreeSet<usize> = covers.iter().flatten().copied().collect();
    let variants: BTreeMap<usize, Vec<Simplified>> = used
        .into_iter()
        .filter_map(|column| {
            children
                .get(column)
                .map(|child| (column, simplest(child, trim_size)))
        })
        .collect();

    let mut candidates = Vec::new();
    for cover in &covers {
        let choices: Vec<&[Simplified]> = cover
            .iter()
            .filter_map(|column| variants.get(column).map(Vec::as_slice))
            .collect();
        candidates.extend(
            product(&choices)
                .into_iter()
                .map(|args| Simplified::combine(*combinator, args)),
        );
    }

    candidates.sort_by_key(Simplified::complexity);
    candidates.dedup();
    let Some(least) = candidates.first().map(Simplified::complexity) else {
        return vec![Simplified::from_node(node)];
    };
    candidates.retain(|candidate| candidate.complexity() <= least + trim_size);
    candidates
}

fn product(choices: &[&[Simplified]]) -> Vec<Vec<Simplified>> {
    choices.iter().fold(vec![Vec::new()], |acc, options| {
        acc.into_iter()
            .flat_map(|prefix| {
                options.iter().map(move |option| {
                    let mut next = prefix.clone();
                    next.push(option.clone());
                    next
                })
            })
            .collect()
    })
}
