//! Shot tree: node aggregation, merge semantics and construction.
//!
//! ## Overview
//!
//! Every path from the synthetic `Start` root is an observed sequence of
//! shots. A node counts how often its shot was hit at that position, tallies
//! how those occurrences ended, and derives continue / winner / error
//! probabilities that always sum to 1.
//!
//! ## Usage
//!
//! ```rust
//! use shot_tree::core::ShotTreeConfig;
//! use shot_tree::tree::build;
//!
//! let config = ShotTreeConfig::default();
//! let tree = build(["4f1b2*", "4f1b3n", "9f1*"], &config).unwrap();
//!
//! assert_eq!(tree.stats().rallies_discarded, 1);
//! let f1 = tree.root().child("4").unwrap().child("f1").unwrap();
//! assert_eq!(f1.hit_count(), 2);
//! ```

pub mod builder;
pub mod node;
pub mod stats;

pub use builder::{build, ShotTree, TreeBuilder};
pub use node::{ShotNode, ROOT_LABEL};
pub use stats::{BuildStats, TreeStats};
