//! Statistics used to rank candidate shots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::ShotTreeError;
use crate::tree::ShotNode;

/// A per-node metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    HitCount,
    SuccessCount,
    ContinueProbability,
    WinnerProbability,
    ErrorProbability,
}

impl Stat {
    pub const ALL: [Stat; 5] = [
        Stat::HitCount,
        Stat::SuccessCount,
        Stat::ContinueProbability,
        Stat::WinnerProbability,
        Stat::ErrorProbability,
    ];

    /// Canonical name, as accepted by `from_str`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Stat::HitCount => "hit_count",
            Stat::SuccessCount => "success_count",
            Stat::ContinueProbability => "continue_probability",
            Stat::WinnerProbability => "winner_probability",
            Stat::ErrorProbability => "error_probability",
        }
    }

    /// Short name used by older tooling.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Stat::HitCount => "num_hit",
            Stat::SuccessCount => "num_success",
            Stat::ContinueProbability => "continue_prob",
            Stat::WinnerProbability => "winner_prob",
            Stat::ErrorProbability => "error_prob",
        }
    }

    /// Read this statistic from a node.
    #[inline]
    #[must_use]
    pub fn value(self, node: &ShotNode) -> f64 {
        match self {
            Stat::HitCount => node.hit_count() as f64,
            Stat::SuccessCount => node.success_count() as f64,
            Stat::ContinueProbability => node.continue_probability(),
            Stat::WinnerProbability => node.winner_probability(),
            Stat::ErrorProbability => node.error_probability(),
        }
    }

    fn valid_names() -> String {
        Stat::ALL
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stat {
    type Err = ShotTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Stat::ALL
            .into_iter()
            .find(|stat| stat.name() == name || stat.alias() == name)
            .ok_or_else(|| ShotTreeError::UnknownStat {
                name: s.to_string(),
                valid: Stat::valid_names(),
            })
    }
}

/// Whether a statistic should be maximized or minimized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Max,
    Min,
}

impl Direction {
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Direction::Max => Direction::Min,
            Direction::Min => Direction::Max,
        }
    }

    /// Strictly better, so an incumbent keeps ties.
    #[inline]
    #[must_use]
    pub fn prefers(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Max => candidate > incumbent,
            Direction::Min => candidate < incumbent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ShotTreeConfig;

    #[test]
    fn test_parse_canonical_and_alias() {
        for stat in Stat::ALL {
            assert_eq!(stat.name().parse::<Stat>().unwrap(), stat);
            assert_eq!(stat.alias().parse::<Stat>().unwrap(), stat);
        }
        assert_eq!(" winner_prob ".parse::<Stat>().unwrap(), Stat::WinnerProbability);
    }

    #[test]
    fn test_parse_unknown_lists_valid_names() {
        let err = "speed".parse::<Stat>().unwrap_err();
        match err {
            ShotTreeError::UnknownStat { name, valid } => {
                assert_eq!(name, "speed");
                for stat in Stat::ALL {
                    assert!(valid.contains(stat.name()));
                }
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_value() {
        let config = ShotTreeConfig::default();
        let node = ShotNode::with_outcomes("f1", [("*", 1), ("n", 3)], &config).unwrap();

        assert_eq!(Stat::HitCount.value(&node), 4.0);
        assert_eq!(Stat::SuccessCount.value(&node), 1.0);
        assert_eq!(Stat::WinnerProbability.value(&node), 0.25);
        assert_eq!(Stat::ErrorProbability.value(&node), 0.75);
        assert_eq!(Stat::ContinueProbability.value(&node), 0.0);
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::Max.reversed(), Direction::Min);
        assert!(Direction::Max.prefers(0.5, 0.4));
        assert!(!Direction::Max.prefers(0.4, 0.4));
        assert!(Direction::Min.prefers(0.1, 0.4));
        assert!(!Direction::Min.prefers(0.4, 0.4));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Stat::WinnerProbability).unwrap();
        assert_eq!(json, "\"winner_probability\"");
        let dir: Direction = serde_json::from_str("\"min\"").unwrap();
        assert_eq!(dir, Direction::Min);
    }
}
