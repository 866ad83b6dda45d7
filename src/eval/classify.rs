// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Box classification with memoization and adaptive refinement

use super::cache::{CacheKind, CacheNode, EvaluationCache, Memo};
use super::stats::{StatAccumulator, StatTrigger};
use crate::error::ShapeError;
use crate::geometry::{Classification, SplitDirection, SubdivBox};
use crate::shape::SurfaceId;
use slotmap::SecondaryMap;
use tracing::trace;

/// Classify a box against the cached shape.
///
/// A box equal to the last one tested by a node, or lying inside it when the
/// last result was resolved, is answered from the memo without touching the
/// surfaces below that node.
pub fn test_box(cache: &mut EvaluationCache<'_>, bx: &SubdivBox, collect: bool) -> Classification {
    let EvaluationCache {
        root,
        surface_memos,
        trigger,
        ..
    } = cache;
    let mut session = Session {
        surfaces: surface_memos,
        trigger: *trigger,
        collect,
    };
    session.test_node(root, bx)
}

/// Classify a box, splitting ambiguous boxes down to `min_volume`.
///
/// The result is resolved when both halves of an ambiguous box agree, and
/// stays ambiguous otherwise or once the box is no larger than `min_volume`.
pub fn ultimate_test_box(
    cache: &mut EvaluationCache<'_>,
    bx: &SubdivBox,
    min_volume: f64,
    collect: bool,
) -> Result<Classification, ShapeError> {
    check_positive("min_volume", min_volume)?;
    Ok(refine(cache, bx, min_volume, collect))
}

pub(crate) fn refine(
    cache: &mut EvaluationCache<'_>,
    bx: &SubdivBox,
    min_volume: f64,
    collect: bool,
) -> Classification {
    let result = test_box(cache, bx, collect);
    if result.is_resolved() || bx.volume() <= min_volume {
        return result;
    }
    let (low, high) = bx.split(SplitDirection::Auto, 0.5);
    let first = refine(cache, &low, min_volume, collect);
    let second = refine(cache, &high, min_volume, collect);
    if first == second {
        first
    } else {
        Classification::Ambiguous
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<(), ShapeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ShapeError::Failure(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

struct Session<'s> {
    surfaces: &'s mut SecondaryMap<SurfaceId, Memo>,
    trigger: StatTrigger,
    collect: bool,
}

impl Session<'_> {
    fn test_node(&mut self, node: &mut CacheNode<'_>, bx: &SubdivBox) -> Classification {
        if let Some(result) = node.memo.recall(bx) {
            node.memo.store(bx, result);
            return result;
        }

        let CacheNode {
            kind, memo, stats, ..
        } = node;
        let result = match kind {
            CacheKind::Constant(value) => *value,
            CacheKind::Final {
                surface_id,
                surface,
                negate,
            } => {
                // Every final node's surface is registered when the cache is built
                let surface_memo = &mut self.surfaces[*surface_id];
                let raw = surface_memo
                    .recall(bx)
                    .unwrap_or_else(|| surface.classify_box(bx));
                surface_memo.store(bx, raw);
                if *negate {
                    raw.complement()
                } else {
                    raw
                }
            }
            CacheKind::Composite {
                combinator,
                children,
            } => {
                // Every child is evaluated: the signature feeds the statistics
                let signature: Vec<Classification> = children
                    .iter_mut()
                    .map(|child| self.test_node(child, bx))
                    .collect();
                let result = combinator.apply(signature.iter().copied());
                if self.collect && self.trigger.records(result) {
                    trace!(code = %bx.code(), ?signature, "recording signature");
                    stats
                        .get_or_insert_with(StatAccumulator::default)
                        .record(signature, bx.volume());
                }
                result
            }
        };
        memo.store(bx, result);
        result
    }
}
