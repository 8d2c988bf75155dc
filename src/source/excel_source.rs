//! Excel Source - one named worksheet of a workbook

use super::{parse_datetime_text, RawCell, RawSheet, SourceReader};
use crate::error::{DashboardError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ExcelSource {
    path: PathBuf,
    sheet: String,
}

impl ExcelSource {
    pub fn new(path: impl AsRef<Path>, sheet: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet: sheet.to_string(),
        }
    }

    /// Map a workbook cell to a raw cell. Error cells read as empty.
    pub fn coerce_cell(cell: &Data) -> RawCell {
        match cell {
            Data::Empty | Data::Error(_) => RawCell::Empty,
            Data::String(s) => RawCell::Text(s.clone()),
            Data::Float(f) => RawCell::Number(*f),
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Bool(b) => RawCell::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(ts) => RawCell::DateTime(ts),
                None => RawCell::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => match parse_datetime_text(s) {
                Some(ts) => RawCell::DateTime(ts),
                None => RawCell::Text(s.clone()),
            },
            Data::DurationIso(s) => RawCell::Text(s.clone()),
        }
    }

    fn header_name(cell: &Data) -> String {
        Self::coerce_cell(cell).as_text().unwrap_or_default()
    }
}

impl SourceReader for ExcelSource {
    fn read(&mut self) -> Result<RawSheet> {
        let mut workbook = open_workbook_auto(&self.path)?;

        if !workbook.sheet_names().iter().any(|name| name == &self.sheet) {
            return Err(DashboardError::SheetNotFound {
                sheet: self.sheet.clone(),
                path: self.path.clone(),
            });
        }

        let range = workbook.worksheet_range(&self.sheet)?;
        let mut rows_iter = range.rows();

        let headers = rows_iter
            .next()
            .map(|row| row.iter().map(Self::header_name).collect::<Vec<_>>())
            .unwrap_or_default();

        let rows: Vec<Vec<RawCell>> = rows_iter
            .map(|row| row.iter().map(Self::coerce_cell).collect())
            .collect();

        debug!(
            "Read {} rows from sheet '{}' of {}",
            rows.len(),
            self.sheet,
            self.path.display()
        );

        Ok(RawSheet { headers, rows })
    }

    fn source_path(&self) -> &Path {
        &self.path
    }

    fn source_type(&self) -> &str {
        "excel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_cells() {
        assert_eq!(ExcelSource::coerce_cell(&Data::Empty), RawCell::Empty);
        assert_eq!(ExcelSource::coerce_cell(&Data::Float(2.55)), RawCell::Number(2.55));
        assert_eq!(ExcelSource::coerce_cell(&Data::Int(6)), RawCell::Number(6.0));
        assert_eq!(
            ExcelSource::coerce_cell(&Data::String("WHITE METAL LANTERN".into())),
            RawCell::Text("WHITE METAL LANTERN".into())
        );
        assert_eq!(
            ExcelSource::coerce_cell(&Data::DateTimeIso("2024-01-15T08:26:00".into())),
            RawCell::DateTime(
                chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(8, 26, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_header_names_are_verbatim() {
        assert_eq!(ExcelSource::header_name(&Data::String(" Country ".into())), " Country ");
        assert_eq!(ExcelSource::header_name(&Data::Float(2011.0)), "2011");
        assert_eq!(ExcelSource::header_name(&Data::Empty), "");
    }

    #[test]
    fn test_missing_workbook_is_error() {
        let mut source = ExcelSource::new("/nonexistent/E-Commerce_UK_DATASET.xlsx", "data");
        assert!(source.read().is_err());
    }
}
