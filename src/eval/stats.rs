// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Classification signature statistics
//!
//! A composite node records, for every box it classifies, the tuple of its
//! children's results together with the box volume. The table tells which
//! children actually decide the node and over how much space.

use super::cache::EvaluationCache;
use super::classify::ultimate_test_box;
use crate::error::ShapeError;
use crate::geometry::{Classification, SubdivBox};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

/// When a composite node records its children's signature
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatTrigger {
    /// Only freshly computed results that are not ambiguous
    #[default]
    Resolved,
    /// Every freshly computed result
    Every,
}

impl StatTrigger {
    pub fn records(self, result: Classification) -> bool {
        match self {
            StatTrigger::Resolved => result.is_resolved(),
            StatTrigger::Every => true,
        }
    }
}

impl FromStr for StatTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resolved" => Ok(StatTrigger::Resolved),
            "every" => Ok(StatTrigger::Every),
            other => Err(format!("unknown statistics trigger: {other}")),
        }
    }
}

impl fmt::Display for StatTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatTrigger::Resolved => f.write_str("resolved"),
            StatTrigger::Every => f.write_str("every"),
        }
    }
}

/// Signature to volume mapping of one composite node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatAccumulator {
    entries: BTreeMap<Vec<Classification>, f64>,
}

impl StatAccumulator {
    pub fn record(&mut self, signature: Vec<Classification>, volume: f64) {
        *self.entries.entry(signature).or_insert(0.0) += volume;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn volume_of(&self, signature: &[Classification]) -> Option<f64> {
        self.entries.get(signature).copied()
    }

    /// Dense row-major export, rows ordered by signature
    pub fn to_table(&self, ncols: usize) -> StatTable {
        let mut data = Vec::with_capacity(self.entries.len() * ncols);
        let mut volumes = Vec::with_capacity(self.entries.len());
        for (signature, volume) in &self.entries {
            data.extend(signature.iter().map(|value| value.as_i8()));
            volumes.push(*volume);
        }
        StatTable {
            nrows: self.entries.len(),
            ncols,
            data,
            volumes,
        }
    }
}

/// Statistics of one composite node as a dense table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatTable {
    /// Distinct signatures observed
    pub nrows: usize,
    /// Children of the node
    pub ncols: usize,
    /// Row-major classification values
    pub data: Vec<i8>,
    /// Accumulated volume per row
    pub volumes: Vec<f64>,
}

impl StatTable {
    pub fn row(&self, index: usize) -> &[i8] {
        &self.data[index * self.ncols..(index + 1) * self.ncols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i8]> + '_ {
        // chunks_exact panics on zero
        self.data.chunks_exact(self.ncols.max(1)).take(self.nrows)
    }

    pub fn total_volume(&self) -> f64 {
        self.volumes.iter().sum()
    }
}

/// Refine the whole box with statistics enabled.
///
/// Memos and previous statistics are cleared first, so the tables describe
/// this decomposition only.
#[instrument(skip(cache, bx), fields(volume = bx.volume()))]
pub fn collect_statistics(
    cache: &mut EvaluationCache<'_>,
    bx: &SubdivBox,
    min_volume: f64,
) -> Result<Classification, ShapeError> {
    cache.reset_stat();
    let result = ultimate_test_box(cache, bx, min_volume, true)?;
    debug!(%result, rows = cache.root().stat_table().map(|t| t.nrows), "statistics collected");
    Ok(result)
}

/// Statistics table of the root node; `None` unless it is composite
pub fn get_stat_table(cache: &EvaluationCache<'_>) -> Option<StatTable> {
    cache.root().stat_table()
}
