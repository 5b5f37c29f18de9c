//! Build and shape statistics for diagnostics and reporting.

use serde::{Deserialize, Serialize};

use super::node::ShotNode;

/// Counters collected while folding rallies into a tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Rally strings offered to the builder.
    pub rallies_seen: u64,

    /// Rallies recorded in the tree (including truncated ones).
    pub rallies_ingested: u64,

    /// Rallies dropped because they are empty or do not open with a serve.
    pub rallies_discarded: u64,

    /// Ingested rallies cut short by an ignored label or an empty token.
    pub rallies_truncated: u64,
}

impl BuildStats {
    /// All counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add another build's counters to these.
    pub fn absorb(&mut self, other: &BuildStats) {
        self.rallies_seen += other.rallies_seen;
        self.rallies_ingested += other.rallies_ingested;
        self.rallies_discarded += other.rallies_discarded;
        self.rallies_truncated += other.rallies_truncated;
    }

    /// Fraction of offered rallies that were discarded.
    #[must_use]
    pub fn discard_rate(&self) -> f64 {
        if self.rallies_seen == 0 {
            0.0
        } else {
            self.rallies_discarded as f64 / self.rallies_seen as f64
        }
    }
}

/// Shape of a built tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeStats {
    /// Total number of nodes, root included.
    pub node_count: usize,

    /// Nodes without children.
    pub leaf_count: usize,

    /// Depth of the deepest node (root = 0).
    pub max_depth: usize,

    /// Total number of parent-child links.
    pub total_edges: usize,
}

impl TreeStats {
    /// Walk the subtree rooted at `root`.
    #[must_use]
    pub fn collect(root: &ShotNode) -> Self {
        let mut stats = TreeStats::default();
        let mut stack = vec![(root, 0usize)];

        while let Some((node, depth)) = stack.pop() {
            stats.node_count += 1;
            stats.max_depth = stats.max_depth.max(depth);
            stats.total_edges += node.children().len();
            if node.is_leaf() {
                stats.leaf_count += 1;
            }
            stack.extend(node.children().iter().map(|c| (c, depth + 1)));
        }

        stats
    }

    /// Average children per node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.total_edges as f64 / self.node_count as f64
        }
    }
}
