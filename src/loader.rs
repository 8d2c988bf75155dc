//! Loader/Normalizer
//!
//! Reads a tabular source once, types its columns and derives the month
//! bucket. Unparseable numbers become exactly 0 and unparseable dates become
//! null; neither is reported to the caller.

use crate::cache::GLOBAL_TABLE_CACHE;
use crate::error::{DashboardError, Result};
use crate::schema::{is_numeric, INVOICE_DATE, MONTH, NUMERIC_COLUMNS, REQUIRED_COLUMNS};
use crate::source::{open_source, DateColumnParser, RawSheet, DEFAULT_SHEET};
use crate::table::Table;
use crate::time;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Options that select which part of a source is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    /// Worksheet name for workbook sources; ignored for CSV.
    pub sheet: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sheet: DEFAULT_SHEET.to_string(),
        }
    }
}

impl LoadOptions {
    pub fn with_sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
        }
    }
}

/// Memoized load with default options.
///
/// A second call with the same path returns the same table without touching
/// the source again, for as long as the file's modification time is unchanged.
pub fn load(path: impl AsRef<Path>) -> Result<Arc<Table>> {
    load_cached(path, &LoadOptions::default())
}

pub fn load_cached(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Arc<Table>> {
    GLOBAL_TABLE_CACHE.get_or_load(path.as_ref(), options)
}

/// Uncached read and normalization of a source.
pub fn read_table(path: &Path, options: &LoadOptions) -> Result<Table> {
    let mut reader = open_source(path, &options.sheet)?;
    info!(
        "Loading {} source {}",
        reader.source_type(),
        reader.source_path().display()
    );

    let sheet = reader.read()?;
    let table = normalize(&sheet, path)?;

    info!(
        "Loaded {} rows x {} columns from {}",
        table.height(),
        table.frame().width(),
        path.display()
    );
    Ok(table)
}

/// Build the typed table from raw cells.
pub fn normalize(sheet: &RawSheet, source: &Path) -> Result<Table> {
    for required in REQUIRED_COLUMNS {
        if sheet.column_index(required).is_none() {
            return Err(DashboardError::MissingColumn {
                column: required.to_string(),
                path: source.to_path_buf(),
            });
        }
    }

    let height = sheet.height();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns: Vec<Series> = Vec::with_capacity(sheet.headers.len() + 1);
    let mut coerced_cells = 0usize;
    let mut undated_rows = 0usize;
    let mut months: Vec<Option<i32>> = vec![None; height];

    for (idx, header) in sheet.headers.iter().enumerate() {
        let name = header.as_str();
        if name.is_empty() || !seen.insert(name) {
            debug!("Skipping unnamed or duplicate column at position {}", idx);
            continue;
        }

        if name == INVOICE_DATE {
            let parser = DateColumnParser::for_cells((0..height).map(|row| sheet.cell(row, idx)));
            debug!("Reading {} with text format {:?}", name, parser.format());
            let mut stamps: Vec<Option<i64>> = Vec::with_capacity(height);
            for row in 0..height {
                match parser.parse(sheet.cell(row, idx)) {
                    Some(dt) => {
                        months[row] = Some(time::date_to_epoch_days(time::month_start(dt.date())));
                        stamps.push(Some(time::datetime_to_millis(dt)));
                    }
                    None => {
                        undated_rows += 1;
                        stamps.push(None);
                    }
                }
            }
            let series = Series::new(name, stamps)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
            columns.push(series);
        } else if is_numeric(name) {
            let values: Vec<f64> = (0..height)
                .map(|row| match sheet.cell(row, idx).as_number() {
                    Some(v) => v,
                    None => {
                        coerced_cells += 1;
                        0.0
                    }
                })
                .collect();
            columns.push(Series::new(name, values));
        } else {
            let values: Vec<Option<String>> = (0..height)
                .map(|row| sheet.cell(row, idx).as_text())
                .collect();
            columns.push(Series::new(name, values));
        }
    }

    for numeric in NUMERIC_COLUMNS {
        if !seen.contains(numeric) {
            debug!("Numeric column {} absent, coercion skipped", numeric);
        }
    }

    columns.push(Series::new(MONTH, months).cast(&DataType::Date)?);

    debug!(
        "Normalized {} rows: {} numeric cells coerced to 0, {} rows without a parseable date",
        height, coerced_cells, undated_rows
    );

    let frame = DataFrame::new(columns)?;
    Ok(Table::new(frame, source))
}
