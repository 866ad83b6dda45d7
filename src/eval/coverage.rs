// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Coverage search over collected statistics
//!
//! A coverage is a set of child columns such that every observed signature
//! holding `value` holds it in at least one chosen column. For an
//! intersection and `value = Outside`, the covered children alone reproduce
//! every `Outside` box the full node produced.

use super::stats::StatTable;
use crate::geometry::Classification;
use std::collections::BTreeSet;

/// Every coverage of the rows of `table` that contain `value`.
///
/// Column indices within each coverage are sorted. A table without such rows
/// is covered by the empty selection.
pub fn find_coverages(table: &StatTable, value: Classification) -> BTreeSet<Vec<usize>> {
    let target = value.as_i8();
    let rows: Vec<&[i8]> = table
        .rows()
        .filter(|row| row.contains(&target))
        .collect();
    if rows.is_empty() {
        return BTreeSet::from([Vec::new()]);
    }
    search(&rows, target)
        .into_iter()
        .map(|mut cover| {
            cover.sort_unstable();
            cover.dedup();
            cover
        })
        .collect()
}

// Branches on the row with the fewest matching columns; every row passed in
// contains `target` at least once.
fn search(rows: &[&[i8]], target: i8) -> Vec<Vec<usize>> {
    let Some(pivot) = rows
        .iter()
        .copied()
        .min_by_key(|row| row.iter().filter(|v| **v == target).count())
    else {
        return vec![Vec::new()];
    };

    let mut covers = Vec::new();
    for (column, _) in pivot.iter().enumerate().filter(|(_, v)| **v == target) {
        let remainder: Vec<&[i8]> = rows
            .iter()
            .filter(|row| row[column] != target)
            .copied()
            .collect();
        if remainder.is_empty() {
            covers.push(vec![column]);
        } else {
            covers.extend(search(&remainder, target).into_iter().map(|mut cover| {
                cover.push(column);
                cover
            }));
        }
    }
    covers
}
