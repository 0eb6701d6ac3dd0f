//! The generalization lattice and its tag store.
//!
//! Every combination of per-attribute levels is a [`Node`]; nodes are bucketed
//! by level (the sum of their components). Tags record whether a node was
//! found k-anonymous and are propagated along the lattice edges using the
//! monotonicity of k-anonymity.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// Anonymity status of a lattice node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tag {
    #[default]
    Untagged,
    KAnonymous,
    NotKAnonymous,
}

impl Tag {
    /// `Some(true)` for k-anonymous, `Some(false)` for failing, `None` if unknown.
    #[must_use]
    pub const fn known(self) -> Option<bool> {
        match self {
            Self::Untagged => None,
            Self::KAnonymous => Some(true),
            Self::NotKAnonymous => Some(false),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Untagged => "untagged",
            Self::KAnonymous => "k-anonymous",
            Self::NotKAnonymous => "not k-anonymous",
        }
    }
}

impl From<bool> for Tag {
    fn from(k_anonymous: bool) -> Self {
        if k_anonymous {
            Self::KAnonymous
        } else {
            Self::NotKAnonymous
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which findings are pushed to neighbouring nodes when a node is tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPropagation {
    /// Only k-anonymous findings propagate, to every node above.
    #[default]
    UpwardOnly,
    /// Failures also propagate, to every node below.
    Bidirectional,
}

/// Edge direction between adjacent levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// All nodes between the bottom node and `max_node`, with their tags.
#[derive(Debug, Clone)]
pub struct Lattice {
    max_node: Node,
    levels: Vec<BTreeMap<Node, Tag>>,
    propagation: TagPropagation,
    descendant_cache: HashMap<(Node, Node), bool>,
    nodes_tagged: usize,
    nodes_total: usize,
}

impl Lattice {
    /// Enumerate every node `n` with `0 <= n[i] <= max_node[i]`.
    #[must_use]
    pub fn new(max_node: Node) -> Self {
        let mut levels = vec![BTreeMap::new(); max_node.level() + 1];
        let mut current = vec![0; max_node.len()];
        let mut nodes_total = 0;
        loop {
            let node = Node::new(current.clone());
            levels[node.level()].insert(node, Tag::Untagged);
            nodes_total += 1;

            // Odometer increment, last component fastest.
            let Some(position) = (0..current.len())
                .rev()
                .find(|&i| current[i] < max_node[i])
            else {
                break;
            };
            current[position] += 1;
            for digit in &mut current[position + 1..] {
                *digit = 0;
            }
        }
        Self {
            max_node,
            levels,
            propagation: TagPropagation::default(),
            descendant_cache: HashMap::new(),
            nodes_tagged: 0,
            nodes_total,
        }
    }

    #[must_use]
    pub fn with_propagation(mut self, propagation: TagPropagation) -> Self {
        self.propagation = propagation;
        self
    }

    #[must_use]
    pub fn propagation(&self) -> TagPropagation {
        self.propagation
    }

    #[must_use]
    pub fn max_node(&self) -> &Node {
        &self.max_node
    }

    #[must_use]
    pub fn min_node(&self) -> Node {
        Node::zeros(self.max_node.len())
    }

    /// Highest level in the lattice.
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.levels.len() - 1
    }

    #[must_use]
    pub fn nodes_total(&self) -> usize {
        self.nodes_total
    }

    #[must_use]
    pub fn nodes_tagged(&self) -> usize {
        self.nodes_tagged
    }

    /// Nodes of one level in lexicographic order.
    pub fn level(&self, level: usize) -> impl Iterator<Item = (&Node, Tag)> {
        self.levels
            .get(level)
            .into_iter()
            .flat_map(|bucket| bucket.iter().map(|(node, tag)| (node, *tag)))
    }

    pub(crate) fn level_nodes(&self, level: usize) -> Vec<Node> {
        self.levels
            .get(level)
            .map(|bucket| bucket.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, node: &Node) -> bool {
        self.levels
            .get(node.level())
            .is_some_and(|bucket| bucket.contains_key(node))
    }

    /// Current tag of `node`, or `None` if it is not part of the lattice.
    #[must_use]
    pub fn tag(&self, node: &Node) -> Option<Tag> {
        self.levels
            .get(node.level())
            .and_then(|bucket| bucket.get(node))
            .copied()
    }

    /// True iff `node != ancestor` and `node` dominates `ancestor`.
    ///
    /// Results are memoized per `(ancestor, node)` pair.
    pub fn is_descendant(&mut self, node: &Node, ancestor: &Node) -> bool {
        let key = (ancestor.clone(), node.clone());
        if let Some(&hit) = self.descendant_cache.get(&key) {
            return hit;
        }
        let result = node != ancestor && node.dominates(ancestor);
        self.descendant_cache.insert(key, result);
        result
    }

    /// Lattice nodes exactly one level away from `node` in `direction`.
    ///
    /// Neighbours are produced with the last component varied first.
    #[must_use]
    pub fn successors(&self, node: &Node, direction: Direction) -> Vec<Node> {
        (0..node.len())
            .rev()
            .filter_map(|i| {
                let level = match direction {
                    Direction::Up => node[i].checked_add(1),
                    Direction::Down => node[i].checked_sub(1),
                }?;
                let mut levels = node.levels().to_vec();
                levels[i] = level;
                let candidate = Node::new(levels);
                self.contains(&candidate).then_some(candidate)
            })
            .collect()
    }

    /// Tag `node` and every node whose status follows from it.
    ///
    /// Already tagged nodes are left alone and stop propagation. A k-anonymous
    /// node tags everything above it; a failing node only tags itself unless
    /// the lattice uses [`TagPropagation::Bidirectional`].
    pub fn tag_node(&mut self, node: &Node, k_anonymous: bool) {
        let direction = match (k_anonymous, self.propagation) {
            (true, _) => Some(Direction::Up),
            (false, TagPropagation::Bidirectional) => Some(Direction::Down),
            (false, TagPropagation::UpwardOnly) => None,
        };
        let mut pending = vec![node.clone()];
        while let Some(current) = pending.pop() {
            let Some(slot) = self
                .levels
                .get_mut(current.level())
                .and_then(|bucket| bucket.get_mut(&current))
            else {
                continue;
            };
            if *slot != Tag::Untagged {
                continue;
            }
            *slot = Tag::from(k_anonymous);
            self.nodes_tagged += 1;
            if let Some(direction) = direction {
                let next = self.successors(&current, direction);
                pending.extend(next.into_iter().rev());
            }
        }
    }

    /// First k-anonymous node in ascending level order, lexicographic within
    /// a level. Loss is approximated by the node level alone.
    #[must_use]
    pub fn select_lowest_loss(&self) -> Option<Node> {
        self.levels.iter().find_map(|bucket| {
            bucket
                .iter()
                .find(|(_, tag)| **tag == Tag::KAnonymous)
                .map(|(node, _)| node.clone())
        })
    }

    /// Every tagged node, grouped by tag, for reporting.
    #[must_use]
    pub fn tag_counts(&self) -> TagCounts {
        let mut counts = TagCounts::default();
        for (_, tag) in self.levels.iter().flat_map(BTreeMap::iter) {
            match tag {
                Tag::Untagged => counts.untagged += 1,
                Tag::KAnonymous => counts.k_anonymous += 1,
                Tag::NotKAnonymous => counts.not_k_anonymous += 1,
            }
        }
        counts
    }
}

/// Number of nodes per tag state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagCounts {
    pub untagged: usize,
    pub k_anonymous: usize,
    pub not_k_anonymous: usize,
}
