//! Tuning parameters for tokenizing, classifying, building and selecting.
//!
//! A single [`ShotTreeConfig`] is passed explicitly to every operation that
//! needs it. The defaults follow the Match Charting Project shorthand.

use serde::{Deserialize, Serialize};

use super::error::{Result, ShotTreeError};

/// Configuration for the shot tree engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotTreeConfig {
    /// Letters that open a shot token (forehand, backhand, slice, volley...).
    pub shot_letters: String,

    /// Trailing markers that keep the shot alive: winner marker and depth codes.
    pub good_endings: String,

    /// Trailing markers that denote an error (net, wide, deep, double fault...).
    pub bad_endings: String,

    /// Marker character that makes an outcome key count as a winner.
    pub winner_marker: char,

    /// Outcome keys counted as "the rally continued".
    pub continuation_markers: Vec<String>,

    /// Leading annotation characters (e.g. a let) stripped from labels so
    /// that replayed shots merge with their plain counterpart.
    pub let_prefix: String,

    /// Characters a rally's first token may start with.
    pub valid_starts: String,

    /// A label containing any of these ends the point at that position.
    pub ignored_label_chars: String,

    /// Minimum number of children (or hits, when listing options) a node
    /// needs before its statistics are trusted under restricted search.
    pub min_samples: usize,

    /// Trigger the rescue search on under-populated nodes, not only empty ones.
    pub restricted_search: bool,

    /// Upper bound on the number of options listed for a node.
    pub max_options: usize,

    /// Allowed drift of the probability sum away from 1.
    pub probability_tolerance: f64,
}

impl Default for ShotTreeConfig {
    fn default() -> Self {
        Self {
            shot_letters: "fbrsvzopuylmhijktq".to_string(),
            good_endings: "*789".to_string(),
            bad_endings: "nwdxg!V@#Ce".to_string(),
            winner_marker: '*',
            continuation_markers: ["7", "8", "9", "continue"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            let_prefix: "c".to_string(),
            valid_starts: "456".to_string(),
            ignored_label_chars: "SRPQ0;".to_string(),
            min_samples: 5,
            restricted_search: false,
            max_options: 5,
            probability_tolerance: 1e-5,
        }
    }
}

impl ShotTreeConfig {
    /// Set the characters accepted as a rally's first character.
    #[must_use]
    pub fn with_valid_starts(mut self, starts: impl Into<String>) -> Self {
        self.valid_starts = starts.into();
        self
    }

    /// Enable or disable restricted search.
    #[must_use]
    pub fn with_restricted_search(mut self, restricted: bool) -> Self {
        self.restricted_search = restricted;
        self
    }

    /// Set the sample threshold used by restricted search and option listing.
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Cap the number of options listed per node.
    #[must_use]
    pub fn with_max_options(mut self, max_options: usize) -> Self {
        self.max_options = max_options;
        self
    }

    /// Replace the set of label characters that end a point.
    #[must_use]
    pub fn with_ignored_label_chars(mut self, chars: impl Into<String>) -> Self {
        self.ignored_label_chars = chars.into();
        self
    }

    /// True for letters that open a shot token.
    #[inline]
    #[must_use]
    pub fn is_shot_letter(&self, c: char) -> bool {
        self.shot_letters.contains(c)
    }

    /// True for any outcome marker, good or bad.
    #[inline]
    #[must_use]
    pub fn is_ending(&self, c: char) -> bool {
        self.good_endings.contains(c) || self.is_bad_ending(c)
    }

    /// True for markers that end the rally with an error.
    #[inline]
    #[must_use]
    pub fn is_bad_ending(&self, c: char) -> bool {
        self.bad_endings.contains(c)
    }

    /// True if a rally may open with `c`.
    #[inline]
    #[must_use]
    pub fn is_valid_start(&self, c: char) -> bool {
        self.valid_starts.contains(c)
    }

    /// True if `key` is listed verbatim as a continuation marker.
    #[must_use]
    pub fn is_continuation(&self, key: &str) -> bool {
        self.continuation_markers.iter().any(|m| m == key)
    }

    /// Check that the character classes can classify tokens consistently.
    pub fn validate(&self) -> Result<()> {
        if self.shot_letters.is_empty() {
            return Err(ShotTreeError::InvalidConfig(
                "shot_letters must not be empty".to_string(),
            ));
        }
        if let Some(c) = self.good_endings.chars().find(|&c| self.is_bad_ending(c)) {
            return Err(ShotTreeError::InvalidConfig(format!(
                "'{c}' is both a good and a bad ending"
            )));
        }
        if let Some(c) = self.shot_letters.chars().find(|&c| self.is_ending(c)) {
            return Err(ShotTreeError::InvalidConfig(format!(
                "'{c}' is both a shot letter and an ending marker"
            )));
        }
        if !self.good_endings.contains(self.winner_marker) {
            return Err(ShotTreeError::InvalidConfig(format!(
                "winner marker '{}' is not a good ending",
                self.winner_marker
            )));
        }
        if self.max_options == 0 {
            return Err(ShotTreeError::InvalidConfig(
                "max_options must be at least 1".to_string(),
            ));
        }
        if self.probability_tolerance.is_nan() || self.probability_tolerance <= 0.0 {
            return Err(ShotTreeError::InvalidConfig(
                "probability_tolerance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
