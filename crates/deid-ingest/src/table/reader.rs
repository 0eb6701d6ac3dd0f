//! CSV file reading with per-column type inference.

use std::fs::File;
use std::path::{Path, PathBuf};

use deid_core::{Row, Value};

use crate::error::{IngestError, Result};

/// Maximum file size for CSV loading (500 MB default).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Storage class inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
}

impl ColumnKind {
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Real)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
        }
    }

    /// Narrowest kind that can hold every non-empty cell.
    pub fn infer<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut kind = Self::Integer;
        for cell in cells.into_iter().filter(|cell| !cell.is_empty()) {
            if kind == Self::Integer && cell.parse::<i64>().is_ok() {
                continue;
            }
            if cell.parse::<f64>().is_ok_and(f64::is_finite) {
                kind = Self::Real;
            } else {
                return Self::Text;
            }
        }
        kind
    }

    /// Convert one cell; empty cells become [`Value::Null`].
    #[must_use]
    pub fn parse(self, cell: &str) -> Value {
        if cell.is_empty() {
            return Value::Null;
        }
        match self {
            Self::Integer => cell
                .parse()
                .map_or_else(|_| Value::from(cell), Value::Integer),
            Self::Real => cell.parse().map_or_else(|_| Value::from(cell), Value::Real),
            Self::Text => Value::from(cell),
        }
    }
}

/// A typed CSV table.
#[derive(Debug, Clone)]
pub struct Table {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub kinds: Vec<ColumnKind>,
    pub rows: Vec<Row>,
}

impl Table {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, in row order.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[index])
    }
}

/// Check file size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_CSV_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| open_error(path, e))?;
    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }
    Ok(())
}

fn open_error(path: &Path, error: std::io::Error) -> IngestError {
    if error.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: error,
        }
    }
}

/// Reads a CSV file with a single header row into a typed [`Table`].
///
/// Cells are trimmed. Column kinds are inferred from the non-empty cells of
/// each column; empty cells load as [`Value::Null`].
pub fn read_table(path: &Path) -> Result<Table> {
    check_file_size(path)?;
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let parse_error = |e: csv::Error| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }

    let mut cells: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        cells.push(record.iter().map(str::to_string).collect());
    }
    if cells.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|i| ColumnKind::infer(cells.iter().map(|row| row[i].as_str())))
        .collect();
    let rows = cells
        .iter()
        .map(|row| {
            row.iter()
                .zip(&kinds)
                .map(|(cell, kind)| kind.parse(cell))
                .collect()
        })
        .collect();

    tracing::debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = cells.len(),
        "loaded CSV table"
    );

    Ok(Table {
        path: path.to_path_buf(),
        headers,
        kinds,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_narrowest_kind() {
        assert_eq!(ColumnKind::infer(["1", "2", ""]), ColumnKind::Integer);
        assert_eq!(ColumnKind::infer(["1", "2.5"]), ColumnKind::Real);
        assert_eq!(ColumnKind::infer(["1", "x"]), ColumnKind::Text);
        assert_eq!(ColumnKind::infer(["inf"]), ColumnKind::Text);
        assert_eq!(ColumnKind::infer(Vec::<&str>::new()), ColumnKind::Integer);
    }

    #[test]
    fn parses_cells_by_kind() {
        assert_eq!(ColumnKind::Integer.parse("42"), Value::Integer(42));
        assert_eq!(ColumnKind::Real.parse("4"), Value::Real(4.0));
        assert_eq!(ColumnKind::Text.parse("42"), Value::from("42"));
        assert_eq!(ColumnKind::Real.parse(""), Value::Null);
    }
}
