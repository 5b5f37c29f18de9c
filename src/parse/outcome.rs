//! Outcome markers: splitting a token into its label and outcome key, and
//! classifying outcome keys.

use serde::{Deserialize, Serialize};

use crate::core::ShotTreeConfig;

/// Outcome key recorded when a shot carries no terminal marker.
pub const CONTINUE_KEY: &str = "continue";

/// How a single shot occurrence ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The rally went on after this shot.
    Continue,
    /// The shot won the point outright.
    Winner,
    /// The shot lost the point.
    Error,
}

impl Outcome {
    /// Classify an outcome key as stored in a node's tally.
    ///
    /// Exact continuation keys (including the unmarked [`CONTINUE_KEY`])
    /// continue the rally, any other key holding the winner marker is a
    /// winner, and everything else is an error.
    #[must_use]
    pub fn of_key(key: &str, config: &ShotTreeConfig) -> Self {
        if key == CONTINUE_KEY || config.is_continuation(key) {
            Outcome::Continue
        } else if key.contains(config.winner_marker) {
            Outcome::Winner
        } else {
            Outcome::Error
        }
    }

    /// Winners and continuations both count as a successful shot.
    #[inline]
    #[must_use]
    pub fn is_success(self) -> bool {
        !matches!(self, Outcome::Error)
    }
}

/// A raw token split into its merge label and outcome key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedToken {
    pub label: String,
    pub outcome_key: String,
    pub outcome: Outcome,
}

/// Strip the trailing marker run and any let prefix from a raw token.
///
/// Whitespace inside the token is ignored.
#[must_use]
pub fn split_token(raw: &str, config: &ShotTreeConfig) -> ClassifiedToken {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let body = cleaned.trim_end_matches(|c: char| config.is_ending(c));
    let markers = &cleaned[body.len()..];
    let label = body.trim_start_matches(|c: char| config.let_prefix.contains(c));

    let outcome_key = if markers.is_empty() {
        CONTINUE_KEY.to_string()
    } else {
        markers.to_string()
    };

    let outcome = Outcome::of_key(&outcome_key, config);

    ClassifiedToken {
        label: label.to_string(),
        outcome_key,
        outcome,
    }
}
