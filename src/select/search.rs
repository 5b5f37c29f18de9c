//! Shot selection over a built tree.
//!
//! All functions are read-only and return a reference into the tree. When
//! no decision can be made they return the root itself; callers detect this
//! with [`is_sentinel`].

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::core::ShotTreeConfig;
use crate::tree::ShotNode;

use super::stat::{Direction, Stat};

/// True when a selection returned the root, meaning "no decision".
#[inline]
#[must_use]
pub fn is_sentinel(choice: &ShotNode, root: &ShotNode) -> bool {
    choice.is_same(root)
}

/// Breadth-first search for a node labeled `label` that has children.
///
/// Leaves are never expanded, so a label that only occurs on leaves is not
/// found. Returns `root` when there is no match.
#[must_use]
pub fn rescue_search<'a>(label: &str, root: &'a ShotNode) -> &'a ShotNode {
    let mut queue = VecDeque::from([root]);

    while let Some(current) = queue.pop_front() {
        if current.label() == label {
            return current;
        }
        queue.extend(current.children().iter().filter(|c| !c.is_leaf()));
    }

    warn!(label = label, "rescue search found no expandable node");
    root
}

/// Pick the child of `node` that maximizes or minimizes `stat`.
///
/// Under-populated nodes (no children, or fewer than `min_samples` under
/// restricted search) are first replaced by a rescue search. Ties go to the
/// earliest child. Returns `root` if there is nothing to choose from.
#[must_use]
pub fn best_by_stat<'a>(
    stat: Stat,
    node: &'a ShotNode,
    root: &'a ShotNode,
    direction: Direction,
    config: &ShotTreeConfig,
) -> &'a ShotNode {
    let Some(source) = decision_node(node, root, config) else {
        return root;
    };

    let mut children = source.children().iter();
    let Some(first) = children.next() else {
        warn!(label = node.label(), stat = %stat, "no candidate shots");
        return root;
    };

    let mut best = first;
    let mut best_value = stat.value(first);
    for child in children {
        let value = stat.value(child);
        if direction.prefers(value, best_value) {
            best = child;
            best_value = value;
        }
    }
    best
}

/// One-ply minimax over the children of `node`.
///
/// For every candidate shot the opponent's best reply is found with
/// [`best_by_stat`] in the reversed direction; the candidate whose reply
/// value is best for us under `direction` wins. `Direction::Max` therefore
/// maximizes the opponent's stat under their least favorable reply.
/// Candidates without any reply data are skipped.
#[must_use]
pub fn best_opponent_response<'a>(
    stat: Stat,
    node: &'a ShotNode,
    root: &'a ShotNode,
    direction: Direction,
    config: &ShotTreeConfig,
) -> &'a ShotNode {
    let Some(source) = decision_node(node, root, config) else {
        return root;
    };

    let reply_direction = direction.reversed();
    let mut best: Option<(&'a ShotNode, f64)> = None;

    for candidate in source.children() {
        let reply = best_by_stat(stat, candidate, root, reply_direction, config);
        if is_sentinel(reply, root) {
            debug!(candidate = candidate.label(), "no opponent reply data");
            continue;
        }

        let value = stat.value(reply);
        let improves = best.map_or(true, |(_, incumbent)| direction.prefers(value, incumbent));
        if improves {
            best = Some((candidate, value));
        }
    }

    match best {
        Some((choice, _)) => choice,
        None => {
            warn!(label = node.label(), stat = %stat, "no candidate with opponent reply data");
            root
        }
    }
}

/// The node whose children a decision is made from.
///
/// Falls back to a rescue search when `node` is under-populated. If the
/// rescue finds nothing, `node` is kept as long as it has any children.
fn decision_node<'a>(
    node: &'a ShotNode,
    root: &'a ShotNode,
    config: &ShotTreeConfig,
) -> Option<&'a ShotNode> {
    let sparse = config.restricted_search && node.children().len() < config.min_samples;
    if !node.is_leaf() && !sparse {
        return Some(node);
    }

    let rescued = rescue_search(node.label(), root);
    if !is_sentinel(rescued, root) {
        debug!(label = node.label(), "using rescued node");
        return Some(rescued);
    }

    if node.is_leaf() {
        warn!(label = node.label(), "no data to choose a next shot");
        None
    } else {
        Some(node)
    }
}
