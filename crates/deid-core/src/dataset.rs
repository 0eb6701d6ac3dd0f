//! Rows plus per-column generalizers, and the projections computed from them.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{DeidError, Result};
use crate::generalizer::Generalizer;
use crate::node::Node;
use crate::value::{Generalized, Value};

/// One input record, positionally aligned with the dataset's attributes.
pub type Row = Vec<Value>;

/// One record after generalization.
pub type GeneralizedRow = Vec<Generalized>;

/// A named quasi-identifier column.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub generalizer: Generalizer,
}

impl Attribute {
    pub fn new(name: impl Into<String>, generalizer: impl Into<Generalizer>) -> Self {
        Self {
            name: name.into(),
            generalizer: generalizer.into(),
        }
    }

    #[must_use]
    pub fn levels(&self) -> usize {
        self.generalizer.levels()
    }
}

/// Immutable table of records and the generalizers for its columns.
#[derive(Debug, Clone)]
pub struct Dataset {
    attributes: Vec<Attribute>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Pair rows with attributes.
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::NoAttributes`] without attributes and
    /// [`DeidError::RowArity`] when a row has the wrong number of values.
    pub fn new(attributes: Vec<Attribute>, rows: Vec<Row>) -> Result<Self> {
        if attributes.is_empty() {
            return Err(DeidError::NoAttributes);
        }
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != attributes.len())
        {
            return Err(DeidError::RowArity {
                row,
                expected: attributes.len(),
                found: values.len(),
            });
        }
        Ok(Self { attributes, rows })
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every attribute at its top level.
    #[must_use]
    pub fn max_node(&self) -> Node {
        Node::new(
            self.attributes
                .iter()
                .map(|a| a.generalizer.top_level())
                .collect(),
        )
    }

    /// Every attribute at level 0.
    #[must_use]
    pub fn min_node(&self) -> Node {
        Node::zeros(self.attributes.len())
    }

    /// Generalize every row to the levels in `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` does not have one component per attribute or a
    /// component exceeds that attribute's top level.
    #[must_use]
    pub fn generalized_projection(&self, node: &Node) -> Vec<GeneralizedRow> {
        self.check_node(node);
        self.rows
            .iter()
            .map(|row| self.generalize_row(row, node))
            .collect()
    }

    fn generalize_row(&self, row: &[Value], node: &Node) -> GeneralizedRow {
        row.iter()
            .zip(&self.attributes)
            .zip(node.levels())
            .map(|((value, attribute), &level)| attribute.generalizer.generalize(value, level))
            .collect()
    }

    fn check_node(&self, node: &Node) {
        assert_eq!(
            node.len(),
            self.attributes.len(),
            "node {node} does not match {} attributes",
            self.attributes.len()
        );
    }

    /// Size of every equivalence class at `node`.
    #[must_use]
    pub fn group_sizes(&self, node: &Node) -> HashMap<GeneralizedRow, usize> {
        let mut groups = HashMap::new();
        for row in self.generalized_projection(node) {
            *groups.entry(row).or_insert(0) += 1;
        }
        groups
    }

    /// Fraction of rows that sit in equivalence classes smaller than `k`.
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::InvalidK`] for `k == 0` and
    /// [`DeidError::EmptyDataset`] when there are no rows.
    pub fn suppression_rate(&self, node: &Node, k: usize) -> Result<f64> {
        if k == 0 {
            return Err(DeidError::InvalidK { k });
        }
        if self.rows.is_empty() {
            return Err(DeidError::EmptyDataset);
        }
        let groups = self.group_sizes(node);
        let suppressed: usize = groups.values().filter(|&&size| size < k).sum();
        #[allow(clippy::cast_precision_loss)]
        let rate = suppressed as f64 / self.rows.len() as f64;
        trace!(
            node = %node,
            k,
            groups = groups.len(),
            suppressed,
            rate,
            "suppression rate"
        );
        Ok(rate)
    }

    /// Generalize to `node` and drop rows in classes smaller than `k`.
    ///
    /// With `keep_suppressed` those rows stay in place with every cell
    /// replaced by [`Generalized::Suppressed`].
    ///
    /// # Errors
    ///
    /// Same as [`Dataset::suppression_rate`].
    pub fn anonymize(&self, node: &Node, k: usize, keep_suppressed: bool) -> Result<AnonymizedTable> {
        if k == 0 {
            return Err(DeidError::InvalidK { k });
        }
        if self.rows.is_empty() {
            return Err(DeidError::EmptyDataset);
        }
        let projection = self.generalized_projection(node);
        let mut groups: HashMap<&GeneralizedRow, usize> = HashMap::new();
        for row in &projection {
            *groups.entry(row).or_insert(0) += 1;
        }
        let equivalence_classes = groups.values().filter(|&&size| size >= k).count();
        let keep: Vec<bool> = projection.iter().map(|row| groups[row] >= k).collect();
        let suppressed_rows = keep.iter().filter(|kept| !**kept).count();
        let rows = projection
            .into_iter()
            .zip(keep)
            .filter_map(|(row, kept)| match (kept, keep_suppressed) {
                (true, _) => Some(row),
                (false, true) => Some(vec![Generalized::Suppressed; row.len()]),
                (false, false) => None,
            })
            .collect();
        Ok(AnonymizedTable {
            node: node.clone(),
            rows,
            total_rows: self.rows.len(),
            suppressed_rows,
            equivalence_classes,
        })
    }
}

/// Generalized records ready for export.
#[derive(Debug, Clone)]
pub struct AnonymizedTable {
    pub node: Node,
    pub rows: Vec<GeneralizedRow>,
    pub total_rows: usize,
    /// Rows that fell into classes smaller than `k`.
    pub suppressed_rows: usize,
    /// Classes of at least `k` rows.
    pub equivalence_classes: usize,
}

impl AnonymizedTable {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn suppression_rate(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        self.suppressed_rows as f64 / self.total_rows as f64
    }
}
