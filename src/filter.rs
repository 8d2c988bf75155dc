//! Filter spec supplied by the UI input layer, with its defaults.

use crate::error::{DashboardError, Result};
use crate::table::Table;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 20;
pub const TOP_N_DEFAULT: usize = 10;

/// Number of most frequent countries selected by default.
pub const DEFAULT_COUNTRY_SELECTION: usize = 3;

/// Date range plus country restriction.
///
/// Both dates are inclusive and `date_end` covers its whole day. An empty
/// country set means no country restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub countries: BTreeSet<String>,
}

impl FilterSpec {
    pub fn new(date_start: NaiveDate, date_end: NaiveDate) -> Self {
        Self {
            date_start,
            date_end,
            countries: BTreeSet::new(),
        }
    }

    /// No date bound and no country restriction.
    pub fn unbounded() -> Self {
        Self::new(NaiveDate::MIN, NaiveDate::MAX)
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    /// Full date range of the table and its three most frequent countries.
    pub fn defaults_for(table: &Table) -> Result<Self> {
        let spec = match table.date_bounds()? {
            Some((first, last)) => Self::new(first.date(), last.date()),
            None => Self::unbounded(),
        };

        let countries = table
            .countries_by_frequency()?
            .into_iter()
            .take(DEFAULT_COUNTRY_SELECTION)
            .map(|(country, _)| country);

        Ok(spec.with_countries(countries))
    }

    pub fn validate(&self) -> Result<()> {
        if self.date_start > self.date_end {
            return Err(DashboardError::InvalidFilter(format!(
                "start date {} is after end date {}",
                self.date_start, self.date_end
            )));
        }
        Ok(())
    }

    pub fn restricts_countries(&self) -> bool {
        !self.countries.is_empty()
    }
}

/// Check a top-N value against the range the UI offers.
pub fn validate_top_n(top_n: usize) -> Result<usize> {
    if (TOP_N_MIN..=TOP_N_MAX).contains(&top_n) {
        Ok(top_n)
    } else {
        Err(DashboardError::InvalidFilter(format!(
            "top N must be between {} and {}, got {}",
            TOP_N_MIN, TOP_N_MAX, top_n
        )))
    }
}
