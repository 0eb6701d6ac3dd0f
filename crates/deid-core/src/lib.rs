//! Generalization-lattice search for k-anonymous tabular data.
//!
//! Each quasi-identifier column gets a [`Generalizer`] with a ladder of
//! levels (0 = original value, top = fully suppressed). A [`Node`] picks one
//! level per column, and the [`Lattice`] of all nodes is searched with the OLA
//! strategy: bisect the level range, evaluate the middle level, and use the
//! monotonicity of k-anonymity to tag whole cones of nodes at once. The
//! lowest-level k-anonymous node wins.
//!
//! # Example
//!
//! ```
//! use deid_core::{Attribute, Dataset, IntervalGeneralizer, SearchSettings, Value, anonymize};
//!
//! let ages = IntervalGeneralizer::new(10.0, 60.0, 4)?;
//! let rows = [10, 12, 50, 52].into_iter().map(|v| vec![Value::Integer(v)]).collect();
//! let dataset = Dataset::new(vec![Attribute::new("age", ages)], rows)?;
//!
//! let outcome = anonymize(&dataset, &SearchSettings::default().with_k(2), &mut ())?;
//! assert_eq!(outcome.node.levels(), &[1]);
//! # Ok::<(), deid_core::DeidError>(())
//! ```

pub mod dataset;
pub mod error;
pub mod generalizer;
pub mod lattice;
pub mod node;
pub mod search;
pub mod value;

pub use dataset::{AnonymizedTable, Attribute, Dataset, GeneralizedRow, Row};
pub use error::{DeidError, Result};
pub use generalizer::{Generalizer, IntervalGeneralizer, MAX_INTERVAL_LEVELS, NominalGeneralizer};
pub use lattice::{Direction, Lattice, Tag, TagCounts, TagPropagation};
pub use node::Node;
pub use search::{
    DEFAULT_K, DEFAULT_MAX_SUPPRESSION_RATE, Outcome, ProgressObserver, SearchSettings,
    SearchStats, SuppressionOracle, anonymize,
};
pub use value::{Generalized, Interval, Value};
