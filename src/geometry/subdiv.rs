// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Subdivision addresses of boxes in a binary split hierarchy
//!
//! The root of a hierarchy has code `1`. Every split appends one bit: `0` for
//! the lower half and `1` for the upper half, so the code of a descendant
//! always starts with the bits of its ancestors. Code `0` marks a box whose
//! position is not tracked (built outside a hierarchy, or deeper than 63
//! splits) and never matches anything.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relation of a queried box to a previously tested one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxRelation {
    /// Same box
    Equal,
    /// Queried box lies strictly inside the tested one
    Subset,
    /// No containment can be derived from the codes
    Unrelated,
}

/// Position of a box within a split hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubdivCode(u64);

impl SubdivCode {
    pub const ROOT: SubdivCode = SubdivCode(1);
    pub const UNTRACKED: SubdivCode = SubdivCode(0);

    const DEPTH_LIMIT_BIT: u64 = 1 << 63;

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn is_tracked(self) -> bool {
        self.0 != 0
    }

    /// Number of splits between the root and this box
    pub fn depth(self) -> Option<u32> {
        self.is_tracked().then(|| 63 - self.0.leading_zeros())
    }

    /// Codes of the lower and upper halves produced by a split
    pub fn children(self) -> (SubdivCode, SubdivCode) {
        if !self.is_tracked() || self.0 & Self::DEPTH_LIMIT_BIT != 0 {
            return (Self::UNTRACKED, Self::UNTRACKED);
        }
        (SubdivCode(self.0 << 1), SubdivCode((self.0 << 1) | 1))
    }

    /// How `self` relates to a box tested earlier with code `tested`
    pub fn relation(self, tested: SubdivCode) -> BoxRelation {
        if !self.is_tracked() || !tested.is_tracked() {
            return BoxRelation::Unrelated;
        }
        if self == tested {
            return BoxRelation::Equal;
        }
        let own_len = 64 - self.0.leading_zeros();
        let tested_len = 64 - tested.0.leading_zeros();
        if own_len > tested_len && self.0 >> (own_len - tested_len) == tested.0 {
            BoxRelation::Subset
        } else {
            BoxRelation::Unrelated
        }
    }
}

impl Default for SubdivCode {
    fn default() -> Self {
        Self::ROOT
    }
}

impl fmt::Display for SubdivCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_tracked() {
            write!(f, "{:b}", self.0)
        } else {
            f.write_str("untracked")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_and_relation() {
        let root = SubdivCode::ROOT;
        let (lower, upper) = root.children();
        assert_eq!(lower.raw(), 0b10);
        assert_eq!(upper.raw(), 0b11);

        assert_eq!(lower.relation(root), BoxRelation::Subset);
        assert_eq!(root.relation(lower), BoxRelation::Unrelated);
        assert_eq!(lower.relation(upper), BoxRelation::Unrelated);
        assert_eq!(upper.relation(upper), BoxRelation::Equal);

        let (grandchild, _) = upper.children();
        assert_eq!(grandchild.relation(root), BoxRelation::Subset);
        assert_eq!(grandchild.relation(upper), BoxRelation::Subset);
        assert_eq!(grandchild.relation(lower), BoxRelation::Unrelated);
    }

    #[test]
    fn test_untracked_never_matches() {
        let untracked = SubdivCode::UNTRACKED;
        assert_eq!(untracked.relation(untracked), BoxRelation::Unrelated);
        assert_eq!(untracked.relation(SubdivCode::ROOT), BoxRelation::Unrelated);
        assert_eq!(SubdivCode::ROOT.relation(untracked), BoxRelation::Unrelated);
    }

    #[test]
    fn test_depth_limit() {
        let mut code = SubdivCode::ROOT;
        for _ in 0..63 {
            code = code.children().1;
        }
        assert_eq!(code.depth(), Some(63));
        assert!(code.is_tracked());
        let (lower, upper) = code.children();
        assert!(!lower.is_tracked());
        assert!(!upper.is_tracked());
    }
}
