//! Runtime configuration from the environment.
//!
//! `.env` files are honoured through `dotenv` by the binary before this is
//! read. Command-line flags override whatever is found here.

use crate::error::{DashboardError, Result};
use crate::filter::{validate_top_n, TOP_N_DEFAULT};
use crate::report::DEFAULT_PREVIEW_ROWS;
use crate::source::DEFAULT_SHEET;
use std::path::PathBuf;

pub const ENV_SOURCE: &str = "DASHBOARD_SOURCE";
pub const ENV_SHEET: &str = "DASHBOARD_SHEET";
pub const ENV_TOP_N: &str = "DASHBOARD_TOP_N";
pub const ENV_PREVIEW_ROWS: &str = "DASHBOARD_PREVIEW_ROWS";

pub const DEFAULT_SOURCE: &str = "E-Commerce_UK_DATASET.xlsx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub source: PathBuf,
    pub sheet: String,
    pub top_n: usize,
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            sheet: DEFAULT_SHEET.to_string(),
            top_n: TOP_N_DEFAULT,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl DashboardConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(source) = lookup(ENV_SOURCE).filter(|v| !v.trim().is_empty()) {
            config.source = PathBuf::from(source.trim());
        }
        if let Some(sheet) = lookup(ENV_SHEET).filter(|v| !v.trim().is_empty()) {
            config.sheet = sheet.trim().to_string();
        }
        if let Some(top_n) = lookup(ENV_TOP_N) {
            let top_n = parse_usize(ENV_TOP_N, &top_n)?;
            config.top_n = validate_top_n(top_n)
                .map_err(|e| DashboardError::Config(format!("{}: {}", ENV_TOP_N, e)))?;
        }
        if let Some(rows) = lookup(ENV_PREVIEW_ROWS) {
            config.preview_rows = parse_usize(ENV_PREVIEW_ROWS, &rows)?;
        }

        Ok(config)
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|_| {
        DashboardError::Config(format!("{} must be a non-negative integer, got '{}'", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.sheet, "data");
        assert_eq!(config.top_n, 10);
        assert_eq!(config.preview_rows, 200);
    }

    #[test]
    fn test_overrides() {
        let config = DashboardConfig::from_lookup(lookup(&[
            (ENV_SOURCE, "exports/sales.csv"),
            (ENV_SHEET, "Sheet1"),
            (ENV_TOP_N, "15"),
            (ENV_PREVIEW_ROWS, "50"),
        ]))
        .unwrap();
        assert_eq!(config.source, PathBuf::from("exports/sales.csv"));
        assert_eq!(config.sheet, "Sheet1");
        assert_eq!(config.top_n, 15);
        assert_eq!(config.preview_rows, 50);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            DashboardConfig::from_lookup(lookup(&[(ENV_TOP_N, "ten")])),
            Err(DashboardError::Config(_))
        ));
        assert!(matches!(
            DashboardConfig::from_lookup(lookup(&[(ENV_TOP_N, "50")])),
            Err(DashboardError::Config(_))
        ));
        assert!(DashboardConfig::from_lookup(lookup(&[(ENV_PREVIEW_ROWS, "-1")])).is_err());
    }
}
