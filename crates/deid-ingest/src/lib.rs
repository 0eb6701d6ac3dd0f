//! Table ingestion and export for deid.
//!
//! This crate sits between files on disk and the `deid-core` search engine.
//!
//! # Features
//!
//! - **CSV Loading**: Read a CSV file with a header row and infer column kinds
//! - **Column Statistics**: Numeric bounds and distinct values per column
//! - **Hierarchy Configuration**: JSON rules that override the discovered generalizers
//! - **Export**: Write generalized rows back to CSV, ranges as midpoints
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use deid_ingest::{HierarchyConfig, into_dataset, read_table};
//!
//! let table = read_table(Path::new("patients.csv"))?;
//! let (headers, dataset) = into_dataset(table, &HierarchyConfig::default())?;
//! ```

mod attributes;
mod config;
mod error;
mod stats;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading and Writing ===
pub use table::{
    ColumnKind, MAX_CSV_FILE_SIZE, Table, check_file_size, check_file_size_with_limit, read_table,
    write_rows, write_table,
};

// === Configuration ===
pub use config::{ColumnRule, DEFAULT_INTERVAL_LEVELS, HierarchyConfig, load_config};

// === Column Statistics ===
pub use stats::{ColumnStats, column_stats};

// === Attribute Construction ===
pub use attributes::{build_attributes, into_dataset};
