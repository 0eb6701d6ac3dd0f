//! Error types for loading and exporting tables.

use std::path::PathBuf;

use deid_core::DeidError;
use thiserror::Error;

/// Errors that can occur while reading input, configuration, or writing output.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit.
    #[error("file {path} is {size} bytes, limit is {max_size}")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Failed to write output.
    #[error("failed to write {path}: {message}")]
    FileWrite { path: PathBuf, message: String },

    // === CSV Parsing Errors ===
    /// Malformed CSV record.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file has a header but no data rows.
    #[error("CSV file has no data rows: {path}")]
    EmptyCsv { path: PathBuf },

    /// Header row missing or blank.
    #[error("could not detect header row in {path}")]
    NoHeaderDetected { path: PathBuf },

    // === Configuration Errors ===
    /// Hierarchy file is not valid JSON for the expected schema.
    #[error("invalid hierarchy configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A column rule cannot be applied to the data.
    #[error("invalid rule for column '{column}': {reason}")]
    InvalidRule { column: String, reason: String },

    /// A nominal hierarchy does not cover a value present in the data.
    #[error("hierarchy for column '{column}' has no entry for '{value}'")]
    UncoveredValue { column: String, value: String },

    /// Generalizer or dataset construction failed.
    #[error(transparent)]
    Model(#[from] DeidError),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/path/to/patients.csv"),
        };
        assert_eq!(err.to_string(), "file not found: /path/to/patients.csv");
    }

    #[test]
    fn test_error_from_model() {
        let err: IngestError = DeidError::InvalidIntervalLevels { levels: 1 }.into();
        assert!(matches!(err, IngestError::Model(_)));
        assert_eq!(
            err.to_string(),
            "interval generalizer needs between 3 and 32 levels, got 1"
        );
    }
}
