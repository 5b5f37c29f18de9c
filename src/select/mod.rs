//! Shot selection algorithms.
//!
//! ## Overview
//!
//! - **Greedy**: pick the child that maximizes or minimizes a [`Stat`]
//! - **Opponent-aware**: one-ply minimax against the opponent's best reply
//! - **Rescue search**: breadth-first fallback for nodes without enough data
//!
//! Every function takes the tree root as well as the current node, and
//! returns the root itself when no decision is possible.
//!
//! ## Usage
//!
//! ```rust
//! use shot_tree::core::ShotTreeConfig;
//! use shot_tree::select::{best_by_stat, is_sentinel, Direction, Stat};
//! use shot_tree::tree::build;
//!
//! let config = ShotTreeConfig::default();
//! let tree = build(["4f1b2*", "4f1b3n", "4f2b1"], &config).unwrap();
//! let root = tree.root();
//! let serve = root.child("4").unwrap();
//!
//! let stat: Stat = "error_probability".parse().unwrap();
//! let shot = best_by_stat(stat, serve, root, Direction::Min, &config);
//! assert!(!is_sentinel(shot, root));
//! ```

pub mod policy;
pub mod search;
pub mod stat;

pub use policy::{Greedy, OpponentAware, ShotPolicy};
pub use search::{best_by_stat, best_opponent_response, is_sentinel, rescue_search};
pub use stat::{Direction, Stat};
