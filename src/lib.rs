//! # shot-tree
//!
//! Statistical shot trees built from charted tennis rallies.
//!
//! ## Design Principles
//!
//! 1. **Counts, not guesses**: Every node only aggregates what was observed.
//!    Probabilities are derived from the outcome tally and must sum to 1.
//!
//! 2. **Permissive parsing, strict aggregation**: Odd rally strings are
//!    tokenized best-effort and malformed rallies are counted and skipped,
//!    but an inconsistent node aborts the build.
//!
//! 3. **Explicit configuration**: Character classes and search thresholds
//!    live in one `ShotTreeConfig` passed to every operation.
//!
//! ## Architecture
//!
//! - **Owned tree**: Each node owns its children; no parent links.
//!
//! - **Read-only selection**: Selection functions borrow the tree and return
//!   references into it, so one tree serves any number of callers.
//!
//! ## Modules
//!
//! - `core`: Configuration and errors
//! - `parse`: Rally tokenizer and outcome classifier
//! - `tree`: Shot nodes, merge semantics, tree construction
//! - `select`: Greedy, opponent-aware and rescue shot selection

pub mod core;
pub mod parse;
pub mod select;
pub mod tree;

// Re-export commonly used types
pub use crate::core::{Result, ShotTreeConfig, ShotTreeError};

pub use crate::parse::{tokenize, Outcome, Tokens};

pub use crate::tree::{build, BuildStats, ShotNode, ShotTree, TreeBuilder, TreeStats};

pub use crate::select::{
    best_by_stat, best_opponent_response, is_sentinel, rescue_search,
    Direction, Greedy, OpponentAware, ShotPolicy, Stat,
};
