//! Error types for the anonymization core.

use thiserror::Error;

/// Errors raised while building generalizers, datasets, or running the search.
#[derive(Debug, Error)]
pub enum DeidError {
    // === Configuration Errors ===
    /// Interval generalizers need an identity level, a suppressed level and at
    /// least one band in between.
    #[error("interval generalizer needs between 3 and 32 levels, got {levels}")]
    InvalidIntervalLevels { levels: usize },

    /// Interval bounds are not finite or are reversed.
    #[error("invalid interval bounds [{min}, {max}]")]
    InvalidIntervalBounds { min: f64, max: f64 },

    /// Nominal hierarchy has no values or a value has an empty sequence.
    #[error("nominal hierarchy is empty")]
    EmptyHierarchy,

    /// Nominal sequences must all have the same number of levels.
    #[error("hierarchy for '{value}' has {found} levels, expected {expected}")]
    HierarchyLengthMismatch {
        value: String,
        expected: usize,
        found: usize,
    },

    /// Level 0 of a nominal sequence must reproduce the value itself.
    #[error("hierarchy for '{value}' does not start with the value itself")]
    HierarchyIdentity { value: String },

    /// Every nominal sequence must end in the same top-level value.
    #[error("hierarchy for '{value}' ends in '{found}', expected shared top '{expected}'")]
    HierarchyTopLevel {
        value: String,
        expected: String,
        found: String,
    },

    /// A dataset needs at least one attribute to build a lattice.
    #[error("dataset has no attributes")]
    NoAttributes,

    /// A row does not line up with the attribute list.
    #[error("row {row} has {found} values, expected {expected}")]
    RowArity {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// `k` must be at least 1.
    #[error("k must be at least 1, got {k}")]
    InvalidK { k: usize },

    /// Suppression threshold must be a fraction.
    #[error("suppression rate must be within [0, 1], got {rate}")]
    InvalidSuppressionRate { rate: f64 },

    // === Search Errors ===
    /// No node in the lattice satisfied the anonymity constraint.
    #[error("no {k}-anonymous generalization found within suppression rate {max_suppression_rate}")]
    NoSolution { k: usize, max_suppression_rate: f64 },

    /// Suppression rate is undefined without rows.
    #[error("dataset is empty; suppression rate is undefined")]
    EmptyDataset,
}

impl DeidError {
    /// Whether this error stems from malformed parameters rather than the data.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::NoSolution { .. } | Self::EmptyDataset)
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, DeidError>;
