// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Evaluation cache mirroring a shape tree
//!
//! Shapes stay immutable and shareable; everything a box query mutates lives
//! here, in a tree owned by one evaluation session. Memos are only meaningful
//! within a single split hierarchy and must be reset before the cache is used
//! with boxes from another one.

use super::stats::{StatAccumulator, StatTable, StatTrigger};
use crate::error::ShapeError;
use crate::geometry::{BoxRelation, Classification, SubdivBox, SubdivCode, Surface};
use crate::shape::{Combinator, Operation, ShapeArena, ShapeId, ShapePayload, SurfaceId};
use slotmap::SecondaryMap;
use tracing::debug;

/// Result of the most recent box query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Memo {
    address: SubdivCode,
    result: Classification,
}

impl Memo {
    pub const EMPTY: Memo = Memo {
        address: SubdivCode::UNTRACKED,
        result: Classification::Ambiguous,
    };

    pub fn address(&self) -> SubdivCode {
        self.address
    }

    pub fn result(&self) -> Classification {
        self.result
    }

    /// Answer from the memo when the box repeats the last query, or lies
    /// inside it and the last result was resolved
    pub fn recall(&self, bx: &SubdivBox) -> Option<Classification> {
        match bx.code().relation(self.address) {
            BoxRelation::Equal => Some(self.result),
            BoxRelation::Subset if self.result.is_resolved() => Some(self.result),
            _ => None,
        }
    }

    pub fn store(&mut self, bx: &SubdivBox, result: Classification) {
        self.address = bx.code();
        self.result = result;
    }

    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }
}

impl Default for Memo {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Per-node evaluation state
#[derive(Debug)]
pub enum CacheKind<'a> {
    Final {
        surface_id: SurfaceId,
        surface: &'a dyn Surface,
        negate: bool,
    },
    Constant(Classification),
    Composite {
        combinator: Combinator,
        children: Vec<CacheNode<'a>>,
    },
}

/// Cache node, one per node of the shape tree
#[derive(Debug)]
pub struct CacheNode<'a> {
    pub(crate) shape: ShapeId,
    pub(crate) kind: CacheKind<'a>,
    pub(crate) memo: Memo,
    pub(crate) stats: Option<StatAccumulator>,
}

impl<'a> CacheNode<'a> {
    fn build(arena: &'a ShapeArena, id: ShapeId) -> Result<Self, ShapeError> {
        let shape = arena.shape(id)?;
        let kind = match (shape.op().constant(), shape.payload()) {
            (Some(value), _) => CacheKind::Constant(value),
            (None, ShapePayload::Surface(surface_id)) => CacheKind::Final {
                surface_id: *surface_id,
                surface: arena.surface(*surface_id)?,
                negate: shape.op() == Operation::Complement,
            },
            (None, ShapePayload::Children(children)) => CacheKind::Composite {
                combinator: shape
                    .op()
                    .combinator()
                    .ok_or_else(|| ShapeError::invalid("children on a non-composite node"))?,
                children: children
                    .iter()
                    .map(|child| Self::build(arena, *child))
                    .collect::<Result<_, _>>()?,
            },
            (None, ShapePayload::Void) => {
                return Err(ShapeError::invalid("void payload on a non-constant node"))
            }
        };
        Ok(Self {
            shape: id,
            kind,
            memo: Memo::EMPTY,
            stats: None,
        })
    }

    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    pub fn kind(&self) -> &CacheKind<'a> {
        &self.kind
    }

    pub fn memo(&self) -> Memo {
        self.memo
    }

    pub fn children(&self) -> &[CacheNode<'a>] {
        match &self.kind {
            CacheKind::Composite { children, .. } => children,
            _ => &[],
        }
    }

    pub fn combinator(&self) -> Option<Combinator> {
        match &self.kind {
            CacheKind::Composite { combinator, .. } => Some(*combinator),
            _ => None,
        }
    }

    /// Collected statistics; composite nodes only
    pub fn stat_table(&self) -> Option<StatTable> {
        let ncols = match &self.kind {
            CacheKind::Composite { children, .. } => children.len(),
            _ => return None,
        };
        Some(
            self.stats
                .as_ref()
                .map(|acc| acc.to_table(ncols))
                .unwrap_or_else(|| StatTable {
                    ncols,
                    ..StatTable::default()
                }),
        )
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(CacheNode::node_count).sum::<usize>()
    }

    fn clear_memos(&mut self) {
        self.memo.clear();
        if let CacheKind::Composite { children, .. } = &mut self.kind {
            children.iter_mut().for_each(CacheNode::clear_memos);
        }
    }

    fn reset(&mut self, stats: bool) {
        self.memo.clear();
        self.stats = match (&self.kind, stats) {
            (CacheKind::Composite { .. }, true) => Some(StatAccumulator::default()),
            _ => None,
        };
        if let CacheKind::Composite { children, .. } = &mut self.kind {
            children.iter_mut().for_each(|child| child.reset(stats));
        }
    }
}

/// Evaluation session state for one shape
#[derive(Debug)]
pub struct EvaluationCache<'a> {
    arena: &'a ShapeArena,
    pub(crate) root: CacheNode<'a>,
    pub(crate) surface_memos: SecondaryMap<SurfaceId, Memo>,
    pub(crate) trigger: StatTrigger,
}

impl<'a> EvaluationCache<'a> {
    /// Mirror the shape tree rooted at `root`.
    ///
    /// Sub-shapes shared between parents get a cache node per occurrence.
    pub fn new(arena: &'a ShapeArena, root: ShapeId) -> Result<Self, ShapeError> {
        let root = CacheNode::build(arena, root)?;
        let mut surface_memos = SecondaryMap::new();
        register_surfaces(&root, &mut surface_memos);
        debug!(nodes = root.node_count(), surfaces = surface_memos.len(), "evaluation cache built");
        Ok(Self {
            arena,
            root,
            surface_memos,
            trigger: StatTrigger::default(),
        })
    }

    pub fn with_trigger(mut self, trigger: StatTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn arena(&self) -> &'a ShapeArena {
        self.arena
    }

    pub fn root(&self) -> &CacheNode<'a> {
        &self.root
    }

    pub fn trigger(&self) -> StatTrigger {
        self.trigger
    }

    pub fn set_trigger(&mut self, trigger: StatTrigger) {
        self.trigger = trigger;
    }

    /// Forget every memo, keeping collected statistics
    pub fn clear_memos(&mut self) {
        self.root.clear_memos();
        self.surface_memos.values_mut().for_each(Memo::clear);
    }

    /// Forget every memo and drop collected statistics
    pub fn reset_cache(&mut self) {
        self.root.reset(false);
        self.surface_memos.values_mut().for_each(Memo::clear);
    }

    /// Forget every memo and start empty statistics tables
    pub fn reset_stat(&mut self) {
        self.root.reset(true);
        self.surface_memos.values_mut().for_each(Memo::clear);
    }
}

fn register_surfaces(node: &CacheNode<'_>, memos: &mut SecondaryMap<SurfaceId, Memo>) {
    match &node.kind {
        CacheKind::Final { surface_id, .. } => {
            memos.insert(*surface_id, Memo::EMPTY);
        }
        CacheKind::Composite { children, .. } => {
            children.iter().for_each(|child| register_surfaces(child, memos))
        }
        CacheKind::Constant(_) => {}
    }
}
