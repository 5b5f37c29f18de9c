//! Folding raw rallies into a shot tree.
//!
//! Rallies that do not open with a serve are dropped and counted rather than
//! reported as errors: charted corpora always contain some truncated rows.
//! Invariant violations, on the other hand, abort the build.

use tracing::{debug, info};

use crate::core::{Result, ShotTreeConfig};
use crate::parse::tokenize;

use super::node::ShotNode;
use super::stats::{BuildStats, TreeStats};

/// A built tree together with the statistics of its construction.
#[derive(Clone, Debug)]
pub struct ShotTree {
    root: ShotNode,
    stats: BuildStats,
}

impl ShotTree {
    /// The synthetic `Start` root; its children are the observed serves.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &ShotNode {
        &self.root
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    #[must_use]
    pub fn into_root(self) -> ShotNode {
        self.root
    }

    /// Shape statistics of the whole tree.
    #[must_use]
    pub fn shape(&self) -> TreeStats {
        TreeStats::collect(&self.root)
    }

    /// Fold in a tree built independently from another shard of the corpus.
    ///
    /// Serves are merged under this root, so the result matches a single
    /// build over both shards.
    pub fn merge(&mut self, other: ShotTree, config: &ShotTreeConfig) -> Result<()> {
        let ShotTree { root, stats } = other;
        for serve in root.into_children() {
            self.root.add_child(serve, config)?;
        }
        self.stats.absorb(&stats);
        Ok(())
    }

    /// See [`ShotNode::prune`].
    pub fn prune(&mut self, max_children: usize, drop_labels: &[&str]) {
        self.root.prune(max_children, drop_labels);
    }
}

/// Incremental tree construction.
#[derive(Debug)]
pub struct TreeBuilder {
    config: ShotTreeConfig,
    root: ShotNode,
    stats: BuildStats,
}

impl TreeBuilder {
    /// Create a builder, rejecting inconsistent configurations.
    pub fn new(config: ShotTreeConfig) -> Result<Self> {
        config.validate()?;
        let root = ShotNode::root(&config);
        Ok(Self {
            config,
            root,
            stats: BuildStats::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ShotTreeConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Tokenize one rally and record it if it opens with a valid serve.
    ///
    /// Returns whether the rally was recorded.
    pub fn add_rally(&mut self, raw: &str) -> Result<bool> {
        self.stats.rallies_seen += 1;

        let tokens = tokenize(raw, &self.config);
        if !self.opens_with_serve(tokens.first().map(String::as_str)) {
            debug!(rally = raw, "discarding rally without a valid serve");
            self.stats.rallies_discarded += 1;
            return Ok(false);
        }

        let complete = self.root.add_point(tokens.as_slice(), &self.config)?;
        self.stats.rallies_ingested += 1;
        if !complete {
            debug!(rally = raw, "rally truncated at an ignored shot");
            self.stats.rallies_truncated += 1;
        }
        Ok(true)
    }

    /// Record every rally of `rallies` in order.
    pub fn extend<I, S>(&mut self, rallies: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in rallies {
            self.add_rally(raw.as_ref())?;
        }
        Ok(())
    }

    pub fn finish(self) -> ShotTree {
        info!(
            seen = self.stats.rallies_seen,
            ingested = self.stats.rallies_ingested,
            discarded = self.stats.rallies_discarded,
            truncated = self.stats.rallies_truncated,
            discard_rate = self.stats.discard_rate(),
            serves = self.root.children().len(),
            "shot tree built"
        );
        ShotTree {
            root: self.root,
            stats: self.stats,
        }
    }

    /// The first meaningful character (after whitespace and let prefixes)
    /// must be a serve marker.
    fn opens_with_serve(&self, first: Option<&str>) -> bool {
        first
            .and_then(|token| {
                token
                    .chars()
                    .find(|&c| !c.is_whitespace() && !self.config.let_prefix.contains(c))
            })
            .is_some_and(|c| self.config.is_valid_start(c))
    }
}

/// Build a tree from a sequence of raw rally strings.
pub fn build<I, S>(raw_points: I, config: &ShotTreeConfig) -> Result<ShotTree>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = TreeBuilder::new(config.clone())?;
    builder.extend(raw_points)?;
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_counts() {
        let config = ShotTreeConfig::default();
        let mut builder = TreeBuilder::new(config).unwrap();

        assert!(builder.add_rally("4f1b2*").unwrap());
        assert!(!builder.add_rally("9f1*").unwrap());
        assert!(!builder.add_rally("").unwrap());
        assert!(builder.add_rally("5f1S").unwrap());

        let stats = builder.stats().clone();
        assert_eq!(stats.rallies_seen, 4);
        assert_eq!(stats.rallies_ingested, 2);
        assert_eq!(stats.rallies_discarded, 2);
        assert_eq!(stats.rallies_truncated, 1);

        let tree = builder.finish();
        assert_eq!(tree.root().children().len(), 2);
        assert_eq!(tree.stats(), &stats);
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        let mut config = ShotTreeConfig::default();
        config.shot_letters.clear();
        assert!(TreeBuilder::new(config).is_err());
    }

    #[test]
    fn test_let_serve_counts_as_serve() {
        let config = ShotTreeConfig::default();
        let tree = build(["c4f1", "4f1"], &config).unwrap();
        assert_eq!(tree.stats().rallies_ingested, 2);
        assert_eq!(tree.root().child("4").unwrap().hit_count(), 2);
    }

    #[test]
    fn test_shard_merge_matches_single_build() {
        let config = ShotTreeConfig::default();
        let rallies = ["4f1b2*", "4f1b3n", "5b2f1f2*", "6*", "9x"];

        let single = build(rallies, &config).unwrap();
        let mut sharded = build(&rallies[..2], &config).unwrap();
        sharded.merge(build(&rallies[2..], &config).unwrap(), &config).unwrap();

        assert_eq!(single.stats(), sharded.stats());
        assert_eq!(single.shape(), sharded.shape());
        assert_eq!(sharded.root().hit_count(), 1);
        let f1 = sharded.root().child("4").unwrap().child("f1").unwrap();
        assert_eq!(f1.hit_count(), 2);
    }
}
