//! Stable index newtype for behavior graph nodes.
//!
//! A behavior graph is an ordered node sequence, so a node is identified by
//! its position. [`NodeIndex`] wraps that position so it cannot be confused
//! with other integers flowing through node parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a node in a behavior graph's node sequence.
///
/// Serializes as a bare integer, matching the `"$node": 3` form used by
/// references and the integer successor fields found in node flow data.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Returns the index as a `usize` for slice access.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Converts a slice position into a `NodeIndex`, failing when it does
    /// not fit in `u32`.
    pub fn from_usize(index: usize) -> Option<NodeIndex> {
        u32::try_from(index).ok().map(NodeIndex)
    }
}

// Display -- just print the inner value.

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeIndex {
    fn from(index: u32) -> Self {
        NodeIndex(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_index_display() {
        assert_eq!(format!("{}", NodeIndex(7)), "7");
    }

    #[test]
    fn node_index_serializes_as_integer() {
        let json = serde_json::to_string(&NodeIndex(42)).unwrap();
        assert_eq!(json, "42");

        let back: NodeIndex = serde_json::from_str("42").unwrap();
        assert_eq!(back, NodeIndex(42));
    }

    #[test]
    fn from_usize_rejects_oversized_positions() {
        assert_eq!(NodeIndex::from_usize(3), Some(NodeIndex(3)));
        if usize::BITS > 32 {
            assert_eq!(NodeIndex::from_usize(u32::MAX as usize + 1), None);
        }
    }

    #[test]
    fn negative_index_is_rejected() {
        assert!(serde_json::from_str::<NodeIndex>("-1").is_err());
    }
}
