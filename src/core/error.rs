//! Error types for tree construction and shot selection.

use thiserror::Error;

/// Errors surfaced by the shot tree engine.
///
/// Malformed rallies are not errors: they are filtered out during the build
/// and counted in [`BuildStats`](crate::tree::BuildStats).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShotTreeError {
    /// A node's counts disagree after a merge. Indicates a classification
    /// defect, never bad input, so construction halts.
    #[error(
        "invariant violated at node '{label}': hit_count {hit_count}, \
         outcome tally total {tally_total}, probability sum {probability_sum:.6}"
    )]
    InvariantViolation {
        label: String,
        hit_count: u64,
        tally_total: u64,
        probability_sum: f64,
    },

    /// A statistic name that does not map to any [`Stat`](crate::select::Stat).
    #[error("unknown statistic '{name}' (valid: {valid})")]
    UnknownStat { name: String, valid: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for shot tree operations.
pub type Result<T> = std::result::Result<T, ShotTreeError>;
