//! Priority-scored path resolution.
//!
//! Resolution walks the tree breadth-first, carrying the part of the path
//! that is still unmatched. A child that answers to the component at
//! position `i` of the remaining path consumes it and everything before it,
//! earning `2^(n - i)` points where `n` is the full path length. Matching
//! early components therefore dominates, and a child that matches nothing
//! is still descended into with the path unchanged, which lets a short path
//! such as `host.port` find `database.host.port`.
//!
//! # Ranking
//!
//! Candidates are ordered by score, highest first. Equal scores are broken
//! deterministically: shallower nodes first, then a node whose key path
//! equals the requested path literally, then lexicographic key path, then
//! tree order.

use std::cmp::Ordering;
use std::collections::VecDeque;

use serde_yaml::Value;

use crate::node::{NodeId, Tree};
use crate::path::ConfigPath;

/// Priority score of a match candidate.
pub type Score = u64;

/// Score every search starts from.
pub const BASE_SCORE: Score = 1;

/// A resolved node together with its priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// The matching node.
    pub node: NodeId,
    /// How well the node matched; higher is better.
    pub score: Score,
}

/// Points for consuming the component at `position` of the remaining path.
pub(crate) fn weight(path_len: usize, position: usize) -> Score {
    u32::try_from(path_len - position)
        .ok()
        .and_then(|shift| (1 as Score).checked_shl(shift))
        .unwrap_or(Score::MAX)
}

/// Highest score any candidate can reach for a path of `path_len`
/// components: every component consumed at the front of the remaining path.
pub(crate) fn max_score(path_len: usize) -> Score {
    let per_component = weight(path_len, 0);
    Score::try_from(path_len)
        .ok()
        .and_then(|len| per_component.checked_mul(len))
        .and_then(|total| total.checked_add(BASE_SCORE))
        .unwrap_or(Score::MAX)
}

/// Run the scored search from `start` with `suffix` still to match.
///
/// `path_len` is the length of the full requested path, used for weights.
/// Returns completed candidates in discovery order, unranked.
pub(crate) fn search(
    tree: &Tree,
    path_len: usize,
    suffix: &[String],
    score: Score,
    start: NodeId,
) -> Vec<Match> {
    let mut completed = Vec::new();
    if suffix.is_empty() {
        return completed;
    }

    let mut expanded = vec![false; tree.len()];
    let mut queue: VecDeque<(&[String], Score, NodeId)> = VecDeque::new();
    queue.push_back((suffix, score, start));

    while let Some((remaining, score, id)) = queue.pop_front() {
        if std::mem::replace(&mut expanded[id.index()], true) {
            continue;
        }

        for &child_id in tree.node(id).children() {
            let child = tree.node(child_id);
            let mut matched = false;

            for (position, component) in remaining.iter().enumerate() {
                if !child.answers_to(component) {
                    continue;
                }
                matched = true;

                let next_score = score.saturating_add(weight(path_len, position));
                let rest = &remaining[position + 1..];
                if rest.is_empty() {
                    completed.push(Match {
                        node: child_id,
                        score: next_score,
                    });
                } else {
                    queue.push_back((rest, next_score, child_id));
                }
            }

            if !matched {
                queue.push_back((remaining, score, child_id));
            }
        }
    }

    completed
}

/// Order candidates best-first using the score and tie-break rules.
pub(crate) fn rank(tree: &Tree, path: &ConfigPath, candidates: Vec<Match>) -> Vec<Match> {
    let mut keyed: Vec<(Match, ConfigPath)> = candidates
        .into_iter()
        .map(|candidate| (candidate, tree.key_path(candidate.node)))
        .collect();

    keyed.sort_by(|(a, a_path), (b, b_path)| {
        b.score
            .cmp(&a.score)
            .then_with(|| a_path.len().cmp(&b_path.len()))
            .then_with(|| literal_first(a_path == path, b_path == path))
            .then_with(|| a_path.cmp(b_path))
            .then_with(|| a.node.cmp(&b.node))
    });

    keyed.into_iter().map(|(candidate, _)| candidate).collect()
}

fn literal_first(a: bool, b: bool) -> Ordering {
    b.cmp(&a)
}

/// Every node matching `path`, best first.
///
/// An empty path yields no matches; it never resolves to the root.
///
/// # Examples
///
/// ```
/// use aliasconf::builder::build;
/// use aliasconf::resolver::resolve_ranked;
/// use aliasconf::ConfigPath;
///
/// let source = serde_yaml::from_str("port: 80\ndatabase:\n  host:\n    port: 5432\n").unwrap();
/// let tree = build(&source).unwrap();
///
/// let ranked = resolve_ranked(&tree, &ConfigPath::parse("host.port").unwrap());
/// assert_eq!(ranked.len(), 2);
/// assert_eq!(tree.key_path(ranked[0].node).to_string(), "database.host.port");
/// assert!(ranked[0].score > ranked[1].score);
/// ```
#[must_use]
pub fn resolve_ranked(tree: &Tree, path: &ConfigPath) -> Vec<Match> {
    if path.is_empty() {
        return Vec::new();
    }

    let candidates = search(tree, path.len(), path.components(), BASE_SCORE, tree.root());
    log::trace!("path '{path}' produced {} candidates", candidates.len());
    rank(tree, path, candidates)
}

/// The single best node for `path`, or `None` when nothing matches.
///
/// # Examples
///
/// ```
/// use aliasconf::builder::build;
/// use aliasconf::resolver::resolve_best;
/// use aliasconf::ConfigPath;
///
/// let source = serde_yaml::from_str("python:\n  aliases: [py]\n  timeout: 30\n").unwrap();
/// let tree = build(&source).unwrap();
///
/// let node = resolve_best(&tree, &ConfigPath::parse("py.timeout").unwrap()).unwrap();
/// assert_eq!(tree.node(node).scalar(), Some(&serde_yaml::Value::from(30)));
/// ```
#[must_use]
pub fn resolve_best(tree: &Tree, path: &ConfigPath) -> Option<NodeId> {
    resolve_ranked(tree, path)
        .first()
        .map(|candidate| candidate.node)
}

/// Values of every node matching `path`, best first.
#[must_use]
pub fn resolve_values(tree: &Tree, path: &ConfigPath) -> Vec<Value> {
    resolve_ranked(tree, path)
        .into_iter()
        .map(|candidate| tree.value_of(candidate.node).into_owned())
        .collect()
}
