//! Shot tree node.
//!
//! Each node aggregates every observed occurrence of one shot at one
//! position of a rally: how often it was hit, how those occurrences ended,
//! and which shots followed it. Children are owned directly; no node keeps a
//! reference to its parent.

use std::cmp::Reverse;
use std::fmt;

use rustc_hash::FxHashMap;
use tracing::error;

use crate::core::{Result, ShotTreeConfig, ShotTreeError};
use crate::parse::{split_token, Outcome, CONTINUE_KEY};

/// Label of the synthetic root node.
pub const ROOT_LABEL: &str = "Start";

/// A node in the shot tree.
#[derive(Clone, Debug)]
pub struct ShotNode {
    label: String,
    hit_count: u64,
    success_count: u64,
    /// Outcome key -> occurrences. Always sums to `hit_count`.
    outcome_tally: FxHashMap<String, u64>,
    /// Sorted by descending `hit_count`, labels unique.
    children: Vec<ShotNode>,
    continue_probability: f64,
    winner_probability: f64,
    error_probability: f64,
}

impl ShotNode {
    /// Create the synthetic `Start` root.
    ///
    /// The root records a single continuation so that it satisfies the same
    /// invariants as every other node.
    #[must_use]
    pub fn root(config: &ShotTreeConfig) -> Self {
        let mut outcome_tally = FxHashMap::default();
        outcome_tally.insert(CONTINUE_KEY.to_string(), 1);

        let mut node = Self {
            label: ROOT_LABEL.to_string(),
            hit_count: 1,
            success_count: 0,
            outcome_tally,
            children: Vec::new(),
            continue_probability: 0.0,
            winner_probability: 0.0,
            error_probability: 0.0,
        };
        node.derive_statistics(config);
        node
    }

    /// Classify one raw token into a fresh leaf observed once.
    #[must_use]
    pub fn from_token(raw: &str, config: &ShotTreeConfig) -> Self {
        let token = split_token(raw, config);
        let mut outcome_tally = FxHashMap::default();
        outcome_tally.insert(token.outcome_key, 1);

        let (continued, won, erred) = match token.outcome {
            Outcome::Continue => (1.0, 0.0, 0.0),
            Outcome::Winner => (0.0, 1.0, 0.0),
            Outcome::Error => (0.0, 0.0, 1.0),
        };

        Self {
            label: token.label,
            hit_count: 1,
            success_count: u64::from(token.outcome.is_success()),
            outcome_tally,
            children: Vec::new(),
            continue_probability: continued,
            winner_probability: won,
            error_probability: erred,
        }
    }

    /// Create a leaf from an explicit outcome tally; the hit count is the
    /// tally total.
    pub fn with_outcomes<I, K>(
        label: impl Into<String>,
        outcomes: I,
        config: &ShotTreeConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        let mut outcome_tally: FxHashMap<String, u64> = FxHashMap::default();
        for (key, count) in outcomes {
            *outcome_tally.entry(key.into()).or_insert(0) += count;
        }
        let hit_count = outcome_tally.values().sum();

        let mut node = Self {
            label: label.into(),
            hit_count,
            success_count: 0,
            outcome_tally,
            children: Vec::new(),
            continue_probability: 0.0,
            winner_probability: 0.0,
            error_probability: 0.0,
        };
        node.refresh(config)?;
        Ok(node)
    }

    // -------------------------------------------------------------------------
    // Read accessors
    // -------------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    #[must_use]
    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    /// Occurrences that were winners or continuations.
    #[inline]
    #[must_use]
    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    #[inline]
    #[must_use]
    pub fn continue_probability(&self) -> f64 {
        self.continue_probability
    }

    #[inline]
    #[must_use]
    pub fn winner_probability(&self) -> f64 {
        self.winner_probability
    }

    #[inline]
    #[must_use]
    pub fn error_probability(&self) -> f64 {
        self.error_probability
    }

    /// Children in descending hit-count order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[ShotNode] {
        &self.children
    }

    /// Take ownership of the children, discarding this node's own counts.
    #[must_use]
    pub fn into_children(self) -> Vec<ShotNode> {
        self.children
    }

    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of occurrences recorded under an outcome key.
    #[must_use]
    pub fn outcome_count(&self, key: &str) -> u64 {
        self.outcome_tally.get(key).copied().unwrap_or(0)
    }

    /// Iterate over `(outcome key, count)` pairs, in no particular order.
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.outcome_tally.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Find the child with the given label.
    #[must_use]
    pub fn child(&self, label: &str) -> Option<&ShotNode> {
        self.children.iter().find(|c| c.label == label)
    }

    /// Children worth offering as the next shot.
    ///
    /// At most `max_options` children, most frequent first. Under restricted
    /// search only children hit more than `min_samples` times are listed.
    pub fn options<'a>(
        &'a self,
        config: &ShotTreeConfig,
    ) -> impl Iterator<Item = &'a ShotNode> + 'a {
        let restricted = config.restricted_search;
        let min_hits = config.min_samples as u64;
        self.children
            .iter()
            .filter(move |c| !restricted || c.hit_count > min_hits)
            .take(config.max_options)
    }

    /// Same node object, not merely equal contents.
    #[inline]
    #[must_use]
    pub fn is_same(&self, other: &ShotNode) -> bool {
        std::ptr::eq(self, other)
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Fold `other` into this node, recursively over children.
    ///
    /// Counts and outcome tallies are summed, children with matching labels
    /// are merged and new ones are adopted. Fails if the merged counts break
    /// the tally or probability invariants.
    pub fn merge(&mut self, other: ShotNode, config: &ShotTreeConfig) -> Result<&mut Self> {
        let ShotNode {
            hit_count,
            outcome_tally,
            children,
            ..
        } = other;

        self.hit_count += hit_count;
        for child in children {
            self.insert_child(child, config)?;
        }
        for (key, count) in outcome_tally {
            *self.outcome_tally.entry(key).or_insert(0) += count;
        }
        self.sort_children();
        self.refresh(config)?;
        Ok(self)
    }

    /// Attach a subtree, merging it into an existing child with the same label.
    pub fn add_child(&mut self, child: ShotNode, config: &ShotTreeConfig) -> Result<()> {
        self.insert_child(child, config)?;
        self.sort_children();
        Ok(())
    }

    /// Record one rally (its remaining tokens) below this node.
    ///
    /// Returns `Ok(false)` when the point was cut short by an ignored label
    /// or an empty token; the tokens before that position stay recorded.
    pub fn add_point<S: AsRef<str>>(
        &mut self,
        tokens: &[S],
        config: &ShotTreeConfig,
    ) -> Result<bool> {
        let Some((head, rest)) = tokens.split_first() else {
            return Ok(true);
        };
        let raw = head.as_ref();
        if raw.trim().is_empty() {
            return Ok(false);
        }

        let candidate = ShotNode::from_token(raw, config);
        if candidate
            .label
            .chars()
            .any(|c| config.ignored_label_chars.contains(c))
        {
            return Ok(false);
        }

        let idx = match self.child_index(&candidate.label) {
            Some(idx) => {
                self.children[idx].merge(candidate, config)?;
                idx
            }
            None => {
                self.children.push(candidate);
                self.children.len() - 1
            }
        };

        let complete = self.children[idx].add_point(rest, config)?;
        self.sort_children();
        Ok(complete)
    }

    /// Keep only the `max_children` most frequent children, drop children
    /// whose label is listed, and recurse into the survivors.
    ///
    /// Irreversible; meant to run once after the build.
    pub fn prune(&mut self, max_children: usize, drop_labels: &[&str]) {
        self.sort_children();
        self.children.truncate(max_children);
        self.children
            .retain(|c| !drop_labels.contains(&c.label.as_str()));
        for child in &mut self.children {
            child.prune(max_children, drop_labels);
        }
    }

    // -------------------------------------------------------------------------
    // Invariants
    // -------------------------------------------------------------------------

    /// Check this node's tally and probability invariants.
    pub fn check_invariants(&self, config: &ShotTreeConfig) -> Result<()> {
        let tally_total: u64 = self.outcome_tally.values().sum();
        let probability_sum =
            self.continue_probability + self.winner_probability + self.error_probability;

        let tally_ok = tally_total == self.hit_count;
        let probability_ok =
            self.hit_count == 0 || (probability_sum - 1.0).abs() <= config.probability_tolerance;

        if tally_ok && probability_ok {
            return Ok(());
        }

        error!(
            label = %self.label,
            hit_count = self.hit_count,
            tally_total,
            probability_sum,
            "shot node invariant violated"
        );
        Err(ShotTreeError::InvariantViolation {
            label: self.label.clone(),
            hit_count: self.hit_count,
            tally_total,
            probability_sum,
        })
    }

    /// Check the invariants of every node in this subtree.
    pub fn validate_subtree(&self, config: &ShotTreeConfig) -> Result<()> {
        self.check_invariants(config)?;
        self.children
            .iter()
            .try_for_each(|c| c.validate_subtree(config))
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn child_index(&self, label: &str) -> Option<usize> {
        self.children.iter().position(|c| c.label == label)
    }

    fn insert_child(&mut self, child: ShotNode, config: &ShotTreeConfig) -> Result<()> {
        match self.child_index(&child.label) {
            Some(idx) => {
                self.children[idx].merge(child, config)?;
            }
            None => self.children.push(child),
        }
        Ok(())
    }

    /// Stable, so equal counts keep their insertion order.
    fn sort_children(&mut self) {
        self.children.sort_by_key(|c| Reverse(c.hit_count));
    }

    fn refresh(&mut self, config: &ShotTreeConfig) -> Result<()> {
        self.derive_statistics(config);
        self.check_invariants(config)
    }

    fn derive_statistics(&mut self, config: &ShotTreeConfig) {
        let (mut continued, mut winners, mut errors) = (0u64, 0u64, 0u64);
        let mut successes = 0u64;
        for (key, &count) in &self.outcome_tally {
            let outcome = Outcome::of_key(key, config);
            if outcome.is_success() {
                successes += count;
            }
            match outcome {
                Outcome::Continue => continued += count,
                Outcome::Winner => winners += count,
                Outcome::Error => errors += count,
            }
        }

        self.success_count = successes;
        if self.hit_count == 0 {
            self.continue_probability = 0.0;
            self.winner_probability = 0.0;
            self.error_probability = 0.0;
        } else {
            let hits = self.hit_count as f64;
            self.continue_probability = continued as f64 / hits;
            self.winner_probability = winners as f64 / hits;
            self.error_probability = errors as f64 / hits;
        }
    }
}

impl fmt::Display for ShotNode {
    /// One option line: label, hits and the three outcome probabilities.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\thit {:>6} | continue {:.2} | winner {:.2} | error {:.2}",
            self.label,
            self.hit_count,
            self.continue_probability,
            self.winner_probability,
            self.error_probability
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ShotTreeConfig {
        ShotTreeConfig::default()
    }

    fn leaf(label: &str, outcomes: &[(&str, u64)]) -> ShotNode {
        ShotNode::with_outcomes(label, outcomes.iter().map(|&(k, v)| (k, v)), &config()).unwrap()
    }

    #[test]
    fn test_root() {
        let root = ShotNode::root(&config());
        assert_eq!(root.label(), ROOT_LABEL);
        assert_eq!(root.hit_count(), 1);
        assert_eq!(root.success_count(), 1);
        assert_eq!(root.continue_probability(), 1.0);
        assert_eq!(root.error_probability(), 0.0);
        assert!(root.is_leaf());
        assert!(root.check_invariants(&config()).is_ok());
    }

    #[test]
    fn test_from_token_winner() {
        let node = ShotNode::from_token("b2*", &config());
        assert_eq!(node.label(), "b2");
        assert_eq!(node.hit_count(), 1);
        assert_eq!(node.success_count(), 1);
        assert_eq!(node.outcome_count("*"), 1);
        assert_eq!(node.winner_probability(), 1.0);
        assert_eq!(node.continue_probability(), 0.0);
    }

    #[test]
    fn test_from_token_error() {
        let node = ShotNode::from_token("f3n@", &config());
        assert_eq!(node.label(), "f3");
        assert_eq!(node.success_count(), 0);
        assert_eq!(node.error_probability(), 1.0);
    }

    #[test]
    fn test_from_token_continue() {
        let node = ShotNode::from_token("f1", &config());
        assert_eq!(node.success_count(), 1);
        assert_eq!(node.outcome_count(CONTINUE_KEY), 1);
        assert_eq!(node.continue_probability(), 1.0);
    }

    #[test]
    fn test_merge_sums_counts() {
        let config = config();
        let mut a = leaf("f1", &[("continue", 2), ("*", 1)]);
        let b = leaf("f1", &[("n", 1), ("*", 1)]);

        a.merge(b, &config).unwrap();

        assert_eq!(a.hit_count(), 5);
        assert_eq!(a.outcome_count("*"), 2);
        assert_eq!(a.outcome_count("n"), 1);
        assert_eq!(a.success_count(), 4);
        assert!((a.continue_probability() - 0.4).abs() < 1e-9);
        assert!((a.winner_probability() - 0.4).abs() < 1e-9);
        assert!((a.error_probability() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_merge_unions_children() {
        let config = config();
        let mut a = leaf("f1", &[("continue", 3)]);
        a.add_child(leaf("b2", &[("*", 1)]), &config).unwrap();
        let mut b = leaf("f1", &[("continue", 2)]);
        b.add_child(leaf("b3", &[("n", 2)]), &config).unwrap();

        a.merge(b, &config).unwrap();

        assert_eq!(a.hit_count(), 5);
        let labels: Vec<_> = a.children().iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["b3", "b2"]);
    }

    #[test]
    fn test_merge_recurses_into_shared_children() {
        let config = config();
        let mut a = leaf("f1", &[("continue", 1)]);
        a.add_child(leaf("b2", &[("*", 1)]), &config).unwrap();
        let mut b = leaf("f1", &[("continue", 1)]);
        b.add_child(leaf("b2", &[("w", 1)]), &config).unwrap();

        a.merge(b, &config).unwrap();

        assert_eq!(a.children().len(), 1);
        let b2 = a.child("b2").unwrap();
        assert_eq!(b2.hit_count(), 2);
        assert_eq!(b2.winner_probability(), 0.5);
        assert_eq!(b2.error_probability(), 0.5);
    }

    #[test]
    fn test_merge_detects_corrupt_tally() {
        let config = config();
        let mut a = leaf("f1", &[("continue", 1)]);
        let mut b = leaf("f1", &[("continue", 1)]);
        b.hit_count = 3;

        let err = a.merge(b, &config).unwrap_err();
        assert!(matches!(
            err,
            ShotTreeError::InvariantViolation { hit_count: 4, tally_total: 2, .. }
        ));
    }

    #[test]
    fn test_add_point_builds_path() {
        let config = config();
        let mut root = ShotNode::root(&config);
        assert!(root.add_point(&["4", "f1", "b2*"], &config).unwrap());
        assert!(root.add_point(&["4", "f1", "b3n"], &config).unwrap());

        let serve = root.child("4").unwrap();
        assert_eq!(serve.hit_count(), 2);
        let f1 = serve.child("f1").unwrap();
        assert_eq!(f1.hit_count(), 2);
        assert_eq!(f1.children().len(), 2);
        assert!(root.validate_subtree(&config).is_ok());
    }

    #[test]
    fn test_add_point_sorts_siblings() {
        let config = config();
        let mut root = ShotNode::root(&config);
        root.add_point(&["5", "b1"], &config).unwrap();
        root.add_point(&["4", "f1"], &config).unwrap();
        root.add_point(&["4", "f2"], &config).unwrap();

        let labels: Vec<_> = root.children().iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["4", "5"]);
    }

    #[test]
    fn test_add_point_stops_at_ignored_label() {
        let config = config();
        let mut root = ShotNode::root(&config);
        let complete = root.add_point(&["4", "S", "f1"], &config).unwrap();

        assert!(!complete);
        let serve = root.child("4").unwrap();
        assert!(serve.is_leaf());
    }

    #[test]
    fn test_add_point_merges_let_serve() {
        let config = config();
        let mut root = ShotNode::root(&config);
        root.add_point(&["c4", "f1"], &config).unwrap();
        root.add_point(&["4", "f1"], &config).unwrap();

        assert_eq!(root.children().len(), 1);
        assert_eq!(root.child("4").unwrap().hit_count(), 2);
    }

    #[test]
    fn test_prune() {
        let config = config();
        let mut root = ShotNode::root(&config);
        for point in [
            &["4", "f1", "b1"][..],
            &["4", "f1", "b2"],
            &["4", "f1", "b2"],
            &["5", "f2"],
            &["6", "f3"],
            &["6", "f3"],
            &["6", "f3"],
        ] {
            root.add_point(point, &config).unwrap();
        }

        root.prune(2, &["b1"]);

        let labels: Vec<_> = root.children().iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["4", "6"]);
        let f1 = root.child("4").unwrap().child("f1").unwrap();
        let grand: Vec<_> = f1.children().iter().map(|c| c.label()).collect();
        assert_eq!(grand, vec!["b2"]);
    }

    #[test]
    fn test_options_respect_limits() {
        let config = config().with_max_options(2);
        let mut root = ShotNode::root(&config);
        for point in [&["4"][..], &["5"], &["5"], &["6"], &["6"], &["6"]] {
            root.add_point(point, &config).unwrap();
        }

        let shown: Vec<_> = root.options(&config).map(|c| c.label()).collect();
        assert_eq!(shown, vec!["6", "5"]);

        let restricted = config.with_restricted_search(true).with_min_samples(2);
        let shown: Vec<_> = root.options(&restricted).map(|c| c.label()).collect();
        assert_eq!(shown, vec!["6"]);
    }

    #[test]
    fn test_display() {
        let node = ShotNode::from_token("b2*", &config());
        let line = node.to_string();
        assert!(line.starts_with("b2\t"));
        assert!(line.contains("winner 1.00"));
    }
}
