//! Export of generalized rows.

use std::io::Write;
use std::path::Path;

use deid_core::GeneralizedRow;

use crate::error::{IngestError, Result};

/// Writes generalized rows to `path` with a header row.
///
/// Ranges are stored as their midpoint and suppressed cells as empty strings.
pub fn write_table(path: &Path, headers: &[String], rows: &[GeneralizedRow]) -> Result<()> {
    let write_error = |message: String| IngestError::FileWrite {
        path: path.to_path_buf(),
        message,
    };
    let file = std::fs::File::create(path).map_err(|e| write_error(e.to_string()))?;
    write_rows(file, headers, rows).map_err(|e| write_error(e.to_string()))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "wrote anonymized table");
    Ok(())
}

/// Writes generalized rows as CSV to any writer.
pub fn write_rows<W: Write>(
    writer: W,
    headers: &[String],
    rows: &[GeneralizedRow],
) -> std::result::Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row.iter().map(|cell| cell.to_scalar().to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
