// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel API for evaluating one shape

use crate::config::EvalConfig;
use crate::error::ShapeError;
use crate::eval::{self, EvaluationCache, Simplified, StatTable, VolumeEstimate};
use crate::geometry::{Classification, SubdivBox};
use crate::shape::{self, ShapeArena, ShapeId};
use nalgebra::Point3;
use std::collections::BTreeSet;
use tracing::{info, instrument};

/// Evaluation session over a shape registered in an arena.
///
/// The session owns the evaluation cache, so it is the unit of exclusive
/// access: run one session per thread over a shared arena.
///
/// Memos are keyed by split address and only valid within one split
/// hierarchy. `bounding_box` works on boxes it roots itself and clears the
/// memos before returning; callers passing boxes from an unrelated hierarchy
/// to `test_box` must call `reset_cache` first.
#[derive(Debug)]
pub struct Kernel<'a> {
    arena: &'a ShapeArena,
    root: ShapeId,
    cache: EvaluationCache<'a>,
    config: EvalConfig,
}

impl<'a> Kernel<'a> {
    /// Create a session with default configuration
    pub fn new(arena: &'a ShapeArena, root: ShapeId) -> Result<Self, ShapeError> {
        Self::with_config(arena, root, EvalConfig::default())
    }

    pub fn with_config(
        arena: &'a ShapeArena,
        root: ShapeId,
        config: EvalConfig,
    ) -> Result<Self, ShapeError> {
        let cache = EvaluationCache::new(arena, root)?.with_trigger(config.stat_trigger);
        Ok(Self {
            arena,
            root,
            cache,
            config,
        })
    }

    pub fn root(&self) -> ShapeId {
        self.root
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn cache(&self) -> &EvaluationCache<'a> {
        &self.cache
    }

    /// Classify a box against the shape
    pub fn test_box(&mut self, bx: &SubdivBox) -> Classification {
        eval::test_box(&mut self.cache, bx, false)
    }

    /// Classify points; never ambiguous
    pub fn test_points(&self, points: &[Point3<f64>]) -> Result<Vec<Classification>, ShapeError> {
        shape::test_points(self.arena, self.root, points)
    }

    /// Classify a box refining ambiguous parts down to the configured volume
    #[instrument(skip(self, bx), fields(volume = bx.volume()))]
    pub fn ultimate_test_box(&mut self, bx: &SubdivBox) -> Result<Classification, ShapeError> {
        eval::ultimate_test_box(&mut self.cache, bx, self.config.min_volume, false)
    }

    /// Shrink `bx` around the shape within the configured tolerance
    #[instrument(skip(self, bx))]
    pub fn bounding_box(&mut self, bx: &mut SubdivBox) -> Result<(), ShapeError> {
        eval::bounding_box(&mut self.cache, bx, self.config.tolerance)?;
        let (lower, upper) = bx.bounds();
        info!(
            lower = ?[lower.x, lower.y, lower.z],
            upper = ?[upper.x, upper.y, upper.z],
            "bounding box found"
        );
        Ok(())
    }

    /// Estimated volume of the shape inside `bx`
    #[instrument(skip(self, bx))]
    pub fn volume(&mut self, bx: &SubdivBox) -> Result<VolumeEstimate, ShapeError> {
        let estimate = eval::estimate_volume(&mut self.cache, bx, self.config.min_volume)?;
        info!(
            volume = estimate.volume,
            unresolved = estimate.unresolved,
            "volume estimated"
        );
        Ok(estimate)
    }

    /// Refine `bx` with statistics enabled
    pub fn collect_statistics(&mut self, bx: &SubdivBox) -> Result<Classification, ShapeError> {
        eval::collect_statistics(&mut self.cache, bx, self.config.min_volume)
    }

    /// Statistics of the root node; `None` unless the root is composite
    pub fn stat_table(&self) -> Option<StatTable> {
        eval::get_stat_table(&self.cache)
    }

    /// Child subsets of the root that reproduce its collected results.
    ///
    /// Sorted from the smallest subset. Empty unless the root is composite.
    pub fn coverages(&self) -> Vec<Vec<usize>> {
        let root = self.cache.root();
        let (Some(combinator), Some(table)) = (root.combinator(), root.stat_table()) else {
            return Vec::new();
        };
        let covers: BTreeSet<Vec<usize>> = eval::find_coverages(&table, combinator.dominant());
        let mut covers: Vec<_> = covers.into_iter().collect();
        covers.sort_by_key(Vec::len);
        covers
    }

    /// Simplest shapes reproducing the collected statistics.
    ///
    /// Run `collect_statistics` first; without statistics the shape comes
    /// back unchanged. Candidates more complex than the simplest one by over
    /// `trim_size` surface senses are dropped.
    pub fn simplest(&self, trim_size: usize) -> Vec<Simplified> {
        let candidates = eval::simplest(self.cache.root(), trim_size);
        info!(
            candidates = candidates.len(),
            complexity = candidates.first().map(Simplified::complexity),
            "simplest shapes found"
        );
        candidates
    }

    pub fn reset_cache(&mut self) {
        self.cache.reset_cache();
    }

    pub fn reset_stat(&mut self) {
        self.cache.reset_stat();
    }
}
