//! Hierarchy configuration file.
//!
//! A JSON document that overrides how individual columns are generalized:
//!
//! ```json
//! {
//!   "interval_levels": 6,
//!   "search": { "k": 10, "max_suppression_rate": 0.05 },
//!   "columns": {
//!     "bp": { "kind": "interval", "min": 40, "max": 180, "levels": 4 },
//!     "agree": {
//!       "kind": "nominal",
//!       "hierarchy": {
//!         "completely agree": ["agree", "agree or disagree"],
//!         "mostly agree": ["agree", "agree or disagree"]
//!       }
//!     },
//!     "name": { "kind": "suppress" }
//!   }
//! }
//! ```
//!
//! Nominal hierarchies list levels above 0; `null` entries mean suppressed.

use std::collections::BTreeMap;
use std::path::Path;

use deid_core::SearchSettings;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Interval levels used for numeric columns without an explicit rule.
pub const DEFAULT_INTERVAL_LEVELS: usize = 6;

/// Per-run generalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HierarchyConfig {
    /// Level count for auto-discovered numeric columns.
    pub interval_levels: usize,
    /// Search parameters; command-line flags take precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchSettings>,
    pub columns: BTreeMap<String, ColumnRule>,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            interval_levels: DEFAULT_INTERVAL_LEVELS,
            search: None,
            columns: BTreeMap::new(),
        }
    }
}

/// How one column is generalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnRule {
    /// Numeric ranges; missing bounds and levels come from the data and
    /// `interval_levels`.
    Interval {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        levels: Option<usize>,
    },
    /// Explicit label hierarchy keyed by the raw cell text.
    Nominal {
        hierarchy: BTreeMap<String, Vec<Option<String>>>,
    },
    /// Keep or fully suppress; nothing in between.
    Suppress,
}

/// Loads a hierarchy configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<HierarchyConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    serde_json::from_str(&text).map_err(|e| IngestError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })
}
