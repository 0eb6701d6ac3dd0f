//! OLA traversal over the lattice.
//!
//! The search bisects the level range. Every node on the middle level that
//! lies strictly above the current anchor is evaluated (or read from its tag)
//! and tagged. A k-anonymous node sends the search into the lower half with
//! the same anchor; a failing node sends it into the upper half anchored at
//! that node. Frames live on an explicit stack and are processed in the same
//! order a depth-first recursion would visit them.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::dataset::Dataset;
use crate::error::{DeidError, Result};
use crate::lattice::{Lattice, Tag, TagPropagation};
use crate::node::Node;

/// Default `k` when none is configured.
pub const DEFAULT_K: usize = 20;

/// Default share of rows that may be suppressed at an accepted node.
pub const DEFAULT_MAX_SUPPRESSION_RATE: f64 = 0.05;

/// Parameters of one anonymization run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Minimum equivalence class size.
    pub k: usize,
    /// A node is accepted when its suppression rate is at most this value.
    pub max_suppression_rate: f64,
    pub propagation: TagPropagation,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            max_suppression_rate: DEFAULT_MAX_SUPPRESSION_RATE,
            propagation: TagPropagation::default(),
        }
    }
}

impl SearchSettings {
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    #[must_use]
    pub fn with_max_suppression_rate(mut self, rate: f64) -> Self {
        self.max_suppression_rate = rate;
        self
    }

    #[must_use]
    pub fn with_propagation(mut self, propagation: TagPropagation) -> Self {
        self.propagation = propagation;
        self
    }

    /// # Errors
    ///
    /// Rejects `k == 0` and rates outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(DeidError::InvalidK { k: self.k });
        }
        if !(0.0..=1.0).contains(&self.max_suppression_rate) {
            return Err(DeidError::InvalidSuppressionRate {
                rate: self.max_suppression_rate,
            });
        }
        Ok(())
    }
}

/// Source of suppression rates for lattice nodes.
pub trait SuppressionOracle {
    /// Fraction of rows in classes smaller than `k` at `node`.
    ///
    /// # Errors
    ///
    /// Implementations fail when the rate is undefined.
    fn suppression_rate(&self, node: &Node, k: usize) -> Result<f64>;
}

impl SuppressionOracle for Dataset {
    fn suppression_rate(&self, node: &Node, k: usize) -> Result<f64> {
        Dataset::suppression_rate(self, node, k)
    }
}

/// Receives the share of tagged nodes as the search proceeds.
pub trait ProgressObserver {
    fn on_progress(&mut self, tagged: usize, total: usize);
}

impl ProgressObserver for () {
    fn on_progress(&mut self, _tagged: usize, _total: usize) {}
}

/// Counters reported after a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Suppression rates actually computed.
    pub evaluations: usize,
    pub nodes_tagged: usize,
    pub nodes_total: usize,
}

struct Frame {
    min_level: usize,
    mid_level: usize,
    max_level: usize,
    anchor: Node,
    candidates: Vec<Node>,
    cursor: usize,
}

impl Lattice {
    /// Tag the whole lattice, anchored at `start`.
    ///
    /// # Errors
    ///
    /// Propagates invalid settings and oracle failures.
    pub fn search<O, P>(
        &mut self,
        oracle: &O,
        settings: &SearchSettings,
        start: &Node,
        observer: &mut P,
    ) -> Result<SearchStats>
    where
        O: SuppressionOracle + ?Sized,
        P: ProgressObserver + ?Sized,
    {
        let max_level = self.max_level();
        self.search_range(oracle, settings, 0, max_level, start, observer)
    }

    /// Tag the nodes between `min_level` and `max_level` that lie above `start`.
    ///
    /// # Errors
    ///
    /// Propagates invalid settings and oracle failures.
    pub fn search_range<O, P>(
        &mut self,
        oracle: &O,
        settings: &SearchSettings,
        min_level: usize,
        max_level: usize,
        start: &Node,
        observer: &mut P,
    ) -> Result<SearchStats>
    where
        O: SuppressionOracle + ?Sized,
        P: ProgressObserver + ?Sized,
    {
        settings.validate()?;
        let span = info_span!(
            "ola_search",
            k = settings.k,
            max_suppression_rate = settings.max_suppression_rate,
            nodes = self.nodes_total()
        );
        let _guard = span.enter();

        let mut evaluations = 0;
        let mut stack: Vec<Frame> = self
            .frame(min_level, max_level, start.clone())
            .into_iter()
            .collect();

        while let Some(frame) = stack.last_mut() {
            let Some(node) = frame.candidates.get(frame.cursor).cloned() else {
                stack.pop();
                continue;
            };
            frame.cursor += 1;
            let (low, mid, high) = (frame.min_level, frame.mid_level, frame.max_level);
            let anchor = frame.anchor.clone();

            if !self.is_descendant(&node, &anchor) {
                continue;
            }

            let k_anonymous = match self.tag(&node).and_then(Tag::known) {
                Some(known) => known,
                None => {
                    evaluations += 1;
                    let rate = oracle.suppression_rate(&node, settings.k)?;
                    debug!(node = %node, rate, "evaluated node");
                    rate <= settings.max_suppression_rate
                }
            };
            self.tag_node(&node, k_anonymous);
            observer.on_progress(self.nodes_tagged(), self.nodes_total());

            let next = if k_anonymous {
                self.frame(low, mid, anchor)
            } else {
                self.frame(mid, high, node)
            };
            stack.extend(next);
        }

        let stats = SearchStats {
            evaluations,
            nodes_tagged: self.nodes_tagged(),
            nodes_total: self.nodes_total(),
        };
        info!(
            evaluations = stats.evaluations,
            nodes_tagged = stats.nodes_tagged,
            nodes_total = stats.nodes_total,
            "lattice search complete"
        );
        Ok(stats)
    }

    /// Frame for `[min_level, max_level]`, or `None` once the range is narrow
    /// enough to stop.
    fn frame(&self, min_level: usize, max_level: usize, anchor: Node) -> Option<Frame> {
        if max_level.saturating_sub(min_level) <= 1 {
            return None;
        }
        let mid_level = usize::midpoint(min_level, max_level);
        Some(Frame {
            min_level,
            mid_level,
            max_level,
            anchor,
            candidates: self.level_nodes(mid_level),
            cursor: 0,
        })
    }
}

/// Result of [`anonymize`].
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Lowest-level k-anonymous node.
    pub node: Node,
    /// Suppression rate at `node`.
    pub suppression_rate: f64,
    pub stats: SearchStats,
    /// The tagged lattice.
    pub lattice: Lattice,
}

/// Build the lattice for `dataset`, search it from the bottom node and pick
/// the lowest-loss k-anonymous node.
///
/// # Errors
///
/// Fails on invalid settings, an empty dataset, or when no node is
/// k-anonymous ([`DeidError::NoSolution`]).
pub fn anonymize<P>(dataset: &Dataset, settings: &SearchSettings, observer: &mut P) -> Result<Outcome>
where
    P: ProgressObserver + ?Sized,
{
    settings.validate()?;
    if dataset.is_empty() {
        return Err(DeidError::EmptyDataset);
    }
    let mut lattice = Lattice::new(dataset.max_node()).with_propagation(settings.propagation);
    debug!(
        attributes = dataset.attributes().len(),
        rows = dataset.len(),
        nodes = lattice.nodes_total(),
        max_level = lattice.max_level(),
        "lattice built"
    );
    let stats = lattice.search(dataset, settings, &dataset.min_node(), observer)?;
    let node = lattice
        .select_lowest_loss()
        .ok_or(DeidError::NoSolution {
            k: settings.k,
            max_suppression_rate: settings.max_suppression_rate,
        })?;
    let suppression_rate = dataset.suppression_rate(&node, settings.k)?;
    info!(node = %node, level = node.level(), suppression_rate, "selected generalization");
    Ok(Outcome {
        node,
        suppression_rate,
        stats,
        lattice,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts every node whose level reaches a threshold.
    struct LevelOracle {
        threshold: usize,
        calls: std::cell::Cell<usize>,
    }

    impl SuppressionOracle for LevelOracle {
        fn suppression_rate(&self, node: &Node, _k: usize) -> Result<f64> {
            self.calls.set(self.calls.get() + 1);
            Ok(if node.level() >= self.threshold { 0.0 } else { 1.0 })
        }
    }

    #[test]
    fn settings_defaults_and_validation() {
        let settings = SearchSettings::default();
        assert_eq!(settings.k, 20);
        assert!((settings.max_suppression_rate - 0.05).abs() < f64::EPSILON);
        assert!(settings.validate().is_ok());
        assert!(matches!(
            settings.with_k(0).validate().unwrap_err(),
            DeidError::InvalidK { k: 0 }
        ));
        assert!(matches!(
            settings.with_max_suppression_rate(1.5).validate().unwrap_err(),
            DeidError::InvalidSuppressionRate { .. }
        ));
    }

    #[test]
    fn narrow_range_does_nothing() {
        let mut lattice = Lattice::new(Node::new(vec![1]));
        let oracle = LevelOracle {
            threshold: 0,
            calls: std::cell::Cell::new(0),
        };
        let stats = lattice
            .search(&oracle, &SearchSettings::default(), &Node::zeros(1), &mut ())
            .unwrap();
        assert_eq!(stats.evaluations, 0);
        assert_eq!(oracle.calls.get(), 0);
        assert_eq!(lattice.select_lowest_loss(), None);
    }

    #[test]
    fn finds_threshold_level() {
        let mut lattice = Lattice::new(Node::new(vec![2, 2]));
        let oracle = LevelOracle {
            threshold: 2,
            calls: std::cell::Cell::new(0),
        };
        let stats = lattice
            .search(&oracle, &SearchSettings::default(), &Node::zeros(2), &mut ())
            .unwrap();
        assert_eq!(stats.evaluations, oracle.calls.get());
        assert_eq!(lattice.select_lowest_loss(), Some(Node::new(vec![0, 2])));
    }

    #[test]
    fn observer_sees_progress() {
        struct Recorder(Vec<(usize, usize)>);
        impl ProgressObserver for Recorder {
            fn on_progress(&mut self, tagged: usize, total: usize) {
                self.0.push((tagged, total));
            }
        }

        let mut lattice = Lattice::new(Node::new(vec![3]));
        let oracle = LevelOracle {
            threshold: 1,
            calls: std::cell::Cell::new(0),
        };
        let mut recorder = Recorder(Vec::new());
        lattice
            .search(&oracle, &SearchSettings::default(), &Node::zeros(1), &mut recorder)
            .unwrap();
        assert_eq!(recorder.0, vec![(3, 4)]);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: SearchSettings =
            serde_json::from_str(r#"{"k": 5, "propagation": "bidirectional"}"#).unwrap();
        assert_eq!(settings.k, 5);
        assert_eq!(settings.propagation, TagPropagation::Bidirectional);
        assert!((settings.max_suppression_rate - DEFAULT_MAX_SUPPRESSION_RATE).abs() < f64::EPSILON);
    }
}
