//! Tabular source readers
//!
//! Every reader yields a [`RawSheet`]: the header row plus untyped cells.
//! Typing and coercion happen later, in the loader.

pub mod csv_source;
pub mod excel_source;

pub use csv_source::CsvSource;
pub use excel_source::ExcelSource;

use crate::error::{DashboardError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::Path;

/// Default worksheet holding the transactions.
pub const DEFAULT_SHEET: &str = "data";

// Slash forms are tried month-first before day-first: `12/1/2010 8:26` is
// 1 December 2010.
const TEXT_DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const TEXT_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// A single untyped cell as read from the source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl RawCell {
    /// Label rendering of the cell. Empty cells are `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) if s.is_empty() => None,
            RawCell::Text(s) => Some(s.clone()),
            RawCell::Number(f) => {
                if f.is_nan() {
                    None
                } else if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", *f as i64))
                } else {
                    Some(f.to_string())
                }
            }
            RawCell::Bool(b) => Some(b.to_string()),
            RawCell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Strict numeric reading; `None` when the cell is not a number.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            RawCell::Number(f) => *f,
            RawCell::Text(s) => s.trim().parse::<f64>().ok()?,
            RawCell::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            RawCell::Empty | RawCell::DateTime(_) => return None,
        };
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }

    /// Timestamp reading; `None` when the cell holds no recognisable date.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            RawCell::DateTime(dt) => Some(*dt),
            RawCell::Text(s) => parse_datetime_text(s),
            RawCell::Number(serial) => excel_serial_to_datetime(*serial),
            RawCell::Empty | RawCell::Bool(_) => None,
        }
    }
}

/// One chrono format applied to a whole text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDateFormat {
    DateTime(&'static str),
    Date(&'static str),
}

impl TextDateFormat {
    fn candidates() -> impl Iterator<Item = TextDateFormat> {
        TEXT_DATETIME_FORMATS
            .into_iter()
            .map(TextDateFormat::DateTime)
            .chain(TEXT_DATE_FORMATS.into_iter().map(TextDateFormat::Date))
    }

    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        match self {
            TextDateFormat::DateTime(fmt) => NaiveDateTime::parse_from_str(text, fmt).ok(),
            TextDateFormat::Date(fmt) => NaiveDate::parse_from_str(text, fmt)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0)),
        }
    }

    /// First format that parses every non-blank value, if any.
    pub fn infer(values: &[&str]) -> Option<Self> {
        let non_blank: Vec<&str> = values
            .iter()
            .copied()
            .filter(|v| !v.trim().is_empty())
            .collect();
        if non_blank.is_empty() {
            return None;
        }
        Self::candidates().find(|format| non_blank.iter().all(|v| format.parse(v).is_some()))
    }
}

/// Parse a textual timestamp; the first matching format wins.
pub fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    TextDateFormat::candidates()
        .find_map(|format| format.parse(text))
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Reads one date column with a single text format, so a slash column is
/// never split between month-first and day-first readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateColumnParser {
    format: Option<TextDateFormat>,
}

impl DateColumnParser {
    pub fn for_cells<'a>(cells: impl Iterator<Item = &'a RawCell>) -> Self {
        let texts: Vec<&str> = cells
            .filter_map(|cell| match cell {
                RawCell::Text(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        Self {
            format: TextDateFormat::infer(&texts),
        }
    }

    pub fn format(&self) -> Option<TextDateFormat> {
        self.format
    }

    pub fn parse(&self, cell: &RawCell) -> Option<NaiveDateTime> {
        match (cell, self.format) {
            (RawCell::Text(s), Some(format)) => format.parse(s),
            _ => cell.as_datetime(),
        }
    }
}

/// Convert an Excel serial day number (1900 date system) to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(chrono::Duration::milliseconds(millis))
}

/// Header row plus data rows of one sheet.
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawSheet {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at `(row, column)`; short rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &RawCell {
        static EMPTY: RawCell = RawCell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// Source reader trait
///
/// Implementations:
/// - CsvSource: header-first delimited text
/// - ExcelSource: one named worksheet of a workbook
pub trait SourceReader {
    /// Read the whole sheet into memory.
    fn read(&mut self) -> Result<RawSheet>;

    fn source_path(&self) -> &Path;

    fn source_type(&self) -> &str;
}

/// Pick a reader from the file extension.
pub fn open_source(path: &Path, sheet: &str) -> Result<Box<dyn SourceReader>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" | "txt" => Ok(Box::new(CsvSource::new(path))),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Box::new(ExcelSource::new(path, sheet))),
        _ => Err(DashboardError::UnsupportedSource(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_text_dates() {
        assert_eq!(
            parse_datetime_text("2024-01-15 08:26:00"),
            Some(ts(2024, 1, 15, 8, 26, 0))
        );
        assert_eq!(
            parse_datetime_text("2024-01-15T08:26:00"),
            Some(ts(2024, 1, 15, 8, 26, 0))
        );
        assert_eq!(parse_datetime_text("2024-01-15"), Some(ts(2024, 1, 15, 0, 0, 0)));
        assert_eq!(
            parse_datetime_text("12/1/2010 8:26"),
            Some(ts(2010, 12, 1, 8, 26, 0))
        );
        // not a valid month-first date, so day-first applies
        assert_eq!(
            parse_datetime_text("13/1/2011 10:00"),
            Some(ts(2011, 1, 13, 10, 0, 0))
        );
        assert_eq!(parse_datetime_text("not a date"), None);
        assert_eq!(parse_datetime_text("  "), None);
    }

    #[test]
    fn test_date_column_reads_one_slash_order() {
        let cells = vec![
            RawCell::Text("1/2/2011 10:00".into()),
            RawCell::Text("12/13/2011 10:00".into()),
            RawCell::Empty,
        ];
        let parser = DateColumnParser::for_cells(cells.iter());
        assert_eq!(parser.format(), Some(TextDateFormat::DateTime("%m/%d/%Y %H:%M")));
        assert_eq!(parser.parse(&cells[0]), Some(ts(2011, 1, 2, 10, 0, 0)));
        assert_eq!(parser.parse(&cells[1]), Some(ts(2011, 12, 13, 10, 0, 0)));
        assert_eq!(parser.parse(&cells[2]), None);
    }

    #[test]
    fn test_day_first_column() {
        let cells = vec![
            RawCell::Text("1/2/2011".into()),
            RawCell::Text("13/2/2011".into()),
        ];
        let parser = DateColumnParser::for_cells(cells.iter());
        assert_eq!(parser.format(), Some(TextDateFormat::Date("%d/%m/%Y")));
        assert_eq!(parser.parse(&cells[0]), Some(ts(2011, 2, 1, 0, 0, 0)));
        assert_eq!(parser.parse(&cells[1]), Some(ts(2011, 2, 13, 0, 0, 0)));
    }

    #[test]
    fn test_mixed_column_falls_back_per_cell() {
        let cells = vec![
            RawCell::Text("2024-01-15 08:26:00".into()),
            RawCell::Text("garbage".into()),
            RawCell::DateTime(ts(2024, 2, 1, 0, 0, 0)),
        ];
        let parser = DateColumnParser::for_cells(cells.iter());
        assert_eq!(parser.format(), None);
        assert_eq!(parser.parse(&cells[0]), Some(ts(2024, 1, 15, 8, 26, 0)));
        assert_eq!(parser.parse(&cells[1]), None);
        assert_eq!(parser.parse(&cells[2]), Some(ts(2024, 2, 1, 0, 0, 0)));
    }

    #[test]
    fn test_excel_serial() {
        // 45306 is 2024-01-15 in the 1900 system
        assert_eq!(excel_serial_to_datetime(45306.0), Some(ts(2024, 1, 15, 0, 0, 0)));
        assert_eq!(excel_serial_to_datetime(45306.5), Some(ts(2024, 1, 15, 12, 0, 0)));
        assert_eq!(excel_serial_to_datetime(f64::NAN), None);
    }

    #[test]
    fn test_cell_readings() {
        assert_eq!(RawCell::Number(17850.0).as_text(), Some("17850".to_string()));
        assert_eq!(RawCell::Number(2.5).as_text(), Some("2.5".to_string()));
        assert_eq!(RawCell::Text(String::new()).as_text(), None);
        assert_eq!(RawCell::Empty.as_text(), None);

        assert_eq!(RawCell::Text(" 12.5 ".into()).as_number(), Some(12.5));
        assert_eq!(RawCell::Text("-3".into()).as_number(), Some(-3.0));
        assert_eq!(RawCell::Text("abc".into()).as_number(), None);
        assert_eq!(RawCell::Text("NaN".into()).as_number(), None);
        assert_eq!(RawCell::Empty.as_number(), None);
    }

    #[test]
    fn test_open_source_dispatch() {
        assert_eq!(
            open_source(Path::new("sales.csv"), DEFAULT_SHEET)
                .unwrap()
                .source_type(),
            "csv"
        );
        assert_eq!(
            open_source(Path::new("sales.XLSX"), DEFAULT_SHEET)
                .unwrap()
                .source_type(),
            "excel"
        );
        assert!(matches!(
            open_source(Path::new("sales.parquet"), DEFAULT_SHEET),
            Err(DashboardError::UnsupportedSource(_))
        ));
    }
}
