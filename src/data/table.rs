//! Dimension table ingest.
//!
//! Turns the bolt-dimension CSV into an ordered list of `DimensionRow`s.
//!
//! Design goals:
//! - **Positional schema**: label followed by five numeric columns; header names are
//!   not interpreted (the header row is skipped)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Quoted fields** may contain the delimiter

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{info, warn};

use crate::domain::DimensionRow;
use crate::error::AppError;

/// Label column plus five numeric columns.
pub const MIN_FIELDS: usize = 6;

/// Read-only table of bolt dimensions, indexed by row position.
#[derive(Debug, Clone, Default)]
pub struct DimensionTable {
    rows: Vec<DimensionRow>,
}

impl DimensionTable {
    pub fn new(rows: Vec<DimensionRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DimensionRow> {
        self.rows.get(index)
    }
}

/// A row skipped during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed table + skipped rows.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: DimensionTable,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load the dimension table from `path`.
pub fn load_dimension_table(path: &Path) -> Result<LoadedTable, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            2,
            format!("CSV file not found: {}", path.display()),
        ));
    }

    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let loaded = read_dimension_table(file)?;
    info!(
        "Loaded {} bolt dimensions from {} ({} row(s) skipped)",
        loaded.table.len(),
        path.display(),
        loaded.row_errors.len()
    );
    Ok(loaded)
}

/// Parse a dimension table from any reader. The first record is treated as the header.
pub fn read_dimension_table<R: Read>(source: R) -> Result<LoadedTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Fallback when the reader has no position: header is line 1.
        let fallback_line = idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                warn!("Skipping CSV line {line}: {e}");
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        if record.iter().all(str::is_empty) {
            continue;
        }
        rows_read += 1;

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        match parse_row(&record, line) {
            Ok(row) => rows.push(row),
            Err(message) => {
                warn!("Skipping CSV line {line}: {message}");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if rows.is_empty() {
        return Err(AppError::new(3, "No valid data was loaded from the CSV file."));
    }

    Ok(LoadedTable {
        table: DimensionTable::new(rows),
        row_errors,
        rows_read,
    })
}

fn parse_row(record: &StringRecord, line: usize) -> Result<DimensionRow, String> {
    if record.len() < MIN_FIELDS {
        return Err(format!(
            "Expected at least {MIN_FIELDS} fields, found {}.",
            record.len()
        ));
    }

    let field = |idx: usize, name: &str| -> Result<f64, String> {
        let raw = record.get(idx).unwrap_or("");
        let value: f64 = raw
            .parse()
            .map_err(|_| format!("Invalid `{name}` value: {raw:?}"))?;
        if !value.is_finite() {
            return Err(format!("Non-finite `{name}` value: {raw:?}"));
        }
        Ok(value)
    };

    Ok(DimensionRow {
        thread_label: record.get(0).unwrap_or("").to_string(),
        body_diameter: field(1, "body_diameter")?,
        pitch: field(2, "pitch")?,
        head_diameter: field(3, "head_diameter")?,
        body_length: field(4, "body_length")?,
        head_height: field(5, "head_height")?,
        line,
    })
}
