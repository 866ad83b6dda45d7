// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Evaluation module - box classification, refinement and integration

mod bounds;
mod cache;
mod classify;
pub mod coverage;
mod simplify;
pub mod stats;
mod volume;

pub use bounds::bounding_box;
pub use cache::{CacheKind, CacheNode, EvaluationCache, Memo};
pub use classify::{test_box, ultimate_test_box};
pub use coverage::find_coverages;
pub use simplify::{simplest, Simplified};
pub use stats::{collect_statistics, get_stat_table, StatAccumulator, StatTable, StatTrigger};
pub use volume::{estimate_volume, volume, VolumeEstimate};
