//! CSV Source - header-first delimited text

use super::{RawCell, RawSheet, SourceReader};
use crate::error::Result;
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads every cell as text; typing is left to the loader.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn coerce_cell(s: &str) -> RawCell {
        if s.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(s.to_string())
        }
    }
}

impl SourceReader for CsvSource {
    fn read(&mut self) -> Result<RawSheet> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(Self::coerce_cell).collect());
        }

        debug!(
            "Read {} CSV rows with {} columns from {}",
            rows.len(),
            headers.len(),
            self.path.display()
        );

        Ok(RawSheet { headers, rows })
    }

    fn source_path(&self) -> &Path {
        &self.path
    }

    fn source_type(&self) -> &str {
        "csv"
    }
}
