//! Shot policies: the "pick the next shot" interface for game loops.
//!
//! - `Greedy`: optimize our own statistic over the next shot
//! - `OpponentAware`: optimize against the opponent's best reply

use crate::core::ShotTreeConfig;
use crate::tree::ShotNode;

use super::search::{best_by_stat, best_opponent_response};
use super::stat::{Direction, Stat};

/// Policy for choosing the next shot from a tree position.
pub trait ShotPolicy: Send + Sync {
    /// Choose a child of `node`, or return `root` when no decision can be made.
    fn choose<'a>(
        &self,
        node: &'a ShotNode,
        root: &'a ShotNode,
        config: &ShotTreeConfig,
    ) -> &'a ShotNode;
}

/// Maximize or minimize a statistic of the shot we hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Greedy {
    pub stat: Stat,
    pub direction: Direction,
}

impl Greedy {
    #[must_use]
    pub const fn max(stat: Stat) -> Self {
        Self {
            stat,
            direction: Direction::Max,
        }
    }

    #[must_use]
    pub const fn min(stat: Stat) -> Self {
        Self {
            stat,
            direction: Direction::Min,
        }
    }
}

impl ShotPolicy for Greedy {
    fn choose<'a>(
        &self,
        node: &'a ShotNode,
        root: &'a ShotNode,
        config: &ShotTreeConfig,
    ) -> &'a ShotNode {
        best_by_stat(self.stat, node, root, self.direction, config)
    }
}

/// Maximize or minimize a statistic of the opponent's reply, assuming the
/// opponent answers as well as the tree allows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpponentAware {
    pub stat: Stat,
    pub direction: Direction,
}

impl OpponentAware {
    #[must_use]
    pub const fn max(stat: Stat) -> Self {
        Self {
            stat,
            direction: Direction::Max,
        }
    }

    #[must_use]
    pub const fn min(stat: Stat) -> Self {
        Self {
            stat,
            direction: Direction::Min,
        }
    }
}

impl ShotPolicy for OpponentAware {
    fn choose<'a>(
        &self,
        node: &'a ShotNode,
        root: &'a ShotNode,
        config: &ShotTreeConfig,
    ) -> &'a ShotNode {
        best_opponent_response(self.stat, node, root, self.direction, config)
    }
}
