use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::app_error::{AppError, AppResult};
use crate::models::SheetRow;

pub const NAME_COLUMN: &str = "Filter Name";
pub const QUERY_COLUMN: &str = "JQL";

/// Reads the filter sheet at `path`. Rows keep source order; ragged rows are
/// a parse error.
pub fn load_rows(path: &Path, delimiter: u8) -> AppResult<Vec<SheetRow>> {
    if !path.is_file() {
        return Err(AppError::FileNotFound(path.display().to_string()));
    }

    let reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_path(path)?;
    let rows = read_rows(reader)?;

    log::info!(
        "Successfully read {} rows from CSV file '{}'",
        rows.len(),
        path.display()
    );
    Ok(rows)
}

fn read_rows<R: std::io::Read>(mut reader: csv::Reader<R>) -> AppResult<Vec<SheetRow>> {
    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(AppError::Parse("header row is missing".to_string()));
    }
    let name_idx = column_index(&headers, NAME_COLUMN)?;
    let query_idx = column_index(&headers, QUERY_COLUMN)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        rows.push(SheetRow {
            row_number: idx + 2,
            name: cell(&record, name_idx),
            query: cell(&record, query_idx),
        });
    }

    Ok(rows)
}

fn column_index(headers: &StringRecord, column: &str) -> AppResult<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| AppError::Parse(format!("missing required column '{column}'")))
}

fn cell(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or_default().to_string()
}
