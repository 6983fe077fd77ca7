//! CSV-to-table conversion.
//!
//! Parses an attached CSV into a [`TableBlock`] (header row + records).
//! Failures here are recoverable: the caller substitutes a visible error
//! paragraph rather than aborting the run.

use std::path::Path;

use tracing::debug;

use brdgen_document::TableBlock;
use brdgen_shared::{BrdError, Result};

/// Convert a CSV file into a table block with a caption naming the source.
///
/// Rows are normalized to the header width: short rows are padded with
/// empty cells, long rows are truncated.
pub fn table_from_csv(path: &Path) -> Result<TableBlock> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| BrdError::Table(format!("{}: {e}", path.display())))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| BrdError::Table(format!("{}: {e}", path.display())))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() {
        return Err(BrdError::Table(format!(
            "{}: no header row",
            path.display()
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| BrdError::Table(format!("{}: {e}", path.display())))?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    debug!(path = %path.display(), columns = headers.len(), rows = rows.len(), "CSV converted");

    Ok(TableBlock {
        headers,
        rows,
        caption: Some(format!("Table: Data from {}", file_label(path))),
    })
}

/// Display name for the CSV source used in the table caption.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "CSV file".to_string())
}
