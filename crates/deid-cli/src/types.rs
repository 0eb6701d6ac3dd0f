use std::path::PathBuf;

use deid_core::{Lattice, Node, SearchSettings, SearchStats};

#[derive(Debug)]
pub struct AnonymizeResult {
    pub input: PathBuf,
    /// `None` for dry runs.
    pub output: Option<PathBuf>,
    pub settings: SearchSettings,
    pub node: Node,
    pub columns: Vec<ColumnSummary>,
    pub total_rows: usize,
    pub released_rows: usize,
    pub suppressed_rows: usize,
    pub equivalence_classes: usize,
    pub suppression_rate: f64,
    pub stats: SearchStats,
}

#[derive(Debug)]
pub struct ColumnSummary {
    pub name: String,
    pub generalizer: &'static str,
    pub level: usize,
    pub top_level: usize,
}

#[derive(Debug)]
pub struct LatticeResult {
    pub headers: Vec<String>,
    pub settings: SearchSettings,
    pub lattice: Lattice,
    /// Lowest-loss k-anonymous node, if any.
    pub selected: Option<Node>,
    pub stats: SearchStats,
    pub max_level: Option<usize>,
}
