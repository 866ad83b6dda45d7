// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Three-valued classification of regions against a shape
//!
//! Boxes resolve to `Inside`, `Outside` or `Ambiguous`; points only ever
//! resolve to `Inside` or `Outside`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a region relative to a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
#[repr(i8)]
pub enum Classification {
    /// Region lies entirely outside the shape
    Outside = -1,
    /// Region may intersect the shape boundary
    Ambiguous = 0,
    /// Region lies entirely inside the shape
    Inside = 1,
}

impl Classification {
    pub fn as_i8(self) -> i8 {
        self as i8
    }

    pub fn is_resolved(self) -> bool {
        self != Classification::Ambiguous
    }

    /// Complement: swaps inside and outside, keeps ambiguity
    pub fn complement(self) -> Self {
        match self {
            Classification::Outside => Classification::Inside,
            Classification::Ambiguous => Classification::Ambiguous,
            Classification::Inside => Classification::Outside,
        }
    }

    /// Sign of a surface function value. Zero counts as positive sense.
    pub fn from_sign(value: f64) -> Self {
        if value.is_sign_negative() && value != 0.0 {
            Classification::Outside
        } else {
            Classification::Inside
        }
    }
}

impl From<Classification> for i8 {
    fn from(value: Classification) -> Self {
        value.as_i8()
    }
}

impl TryFrom<i8> for Classification {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Classification::Outside),
            0 => Ok(Classification::Ambiguous),
            1 => Ok(Classification::Inside),
            other => Err(format!("classification must be -1, 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Classification::Outside => "outside",
            Classification::Ambiguous => "ambiguous",
            Classification::Inside => "inside",
        };
        f.write_str(label)
    }
}

/// Intersection of classifications.
///
/// `Outside` dominates and stops the scan; `Ambiguous` downgrades the result
/// but the scan continues, since a later `Outside` still wins.
pub fn intersection<I>(values: I) -> Classification
where
    I: IntoIterator<Item = Classification>,
{
    let mut result = Classification::Inside;
    for value in values {
        match value {
            Classification::Outside => return Classification::Outside,
            Classification::Ambiguous => result = Classification::Ambiguous,
            Classification::Inside => {}
        }
    }
    result
}

/// Union of classifications, the dual of [`intersection`].
pub fn union<I>(values: I) -> Classification
where
    I: IntoIterator<Item = Classification>,
{
    let mut result = Classification::Outside;
    for value in values {
        match value {
            Classification::Inside => return Classification::Inside,
            Classification::Ambiguous => result = Classification::Ambiguous,
            Classification::Outside => {}
        }
    }
    result
}
