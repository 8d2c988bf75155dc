//! Immutable normalized transactions table.

use crate::error::{DashboardError, Result};
use crate::frame;
use crate::schema::{
    COST, COUNTRY, CUSTOMER_ID, DESCRIPTION, INVOICE_DATE, INVOICE_NO, MONTH, PROFIT, QUANTITY,
    REVENUE, STOCK_CODE, UNIT_PRICE,
};
use crate::time;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One row of the normalized table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub invoice_no: Option<String>,
    pub stock_code: Option<String>,
    pub description: Option<String>,
    pub quantity: f64,
    pub invoice_date: Option<NaiveDateTime>,
    pub unit_price: f64,
    pub customer_id: Option<String>,
    pub country: Option<String>,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub month: Option<NaiveDate>,
}

/// The loaded table. Read-only once built; downstream steps work on copies.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    source: PathBuf,
}

impl Table {
    pub fn new(frame: DataFrame, source: impl Into<PathBuf>) -> Self {
        Self {
            frame,
            source: source.into(),
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    pub fn require_columns(&self, columns: &[&str]) -> Result<()> {
        match columns.iter().find(|c| !self.has_column(c)) {
            Some(missing) => Err(DashboardError::MissingColumn {
                column: missing.to_string(),
                path: self.source.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Earliest and latest invoice timestamps; `None` without any dated row.
    pub fn date_bounds(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime)>> {
        let stamps = self.frame.column(INVOICE_DATE)?.cast(&DataType::Int64)?;
        let stamps = stamps.i64()?;

        let bounds = match (stamps.min(), stamps.max()) {
            (Some(lo), Some(hi)) => time::millis_to_datetime(lo).zip(time::millis_to_datetime(hi)),
            _ => None,
        };
        Ok(bounds)
    }

    /// Countries ordered by row count, most frequent first; ties by name.
    pub fn countries_by_frequency(&self) -> Result<Vec<(String, usize)>> {
        let counts = self
            .frame
            .clone()
            .lazy()
            .filter(col(COUNTRY).is_not_null())
            .group_by([col(COUNTRY)])
            .agg([len().alias("rows")])
            .collect()?;

        let names = frame::string_values(&counts, COUNTRY)?;
        let rows = frame::u64_values(&counts, "rows")?;

        let mut ranked: Vec<(String, usize)> = names
            .into_iter()
            .zip(rows)
            .filter_map(|(name, n)| name.map(|name| (name, n as usize)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(ranked)
    }

    /// Up to `limit` rows in table order.
    pub fn records(&self, limit: usize) -> Result<Vec<TransactionRecord>> {
        records_of(&self.frame, limit)
    }
}

/// Typed view of the first `limit` rows of a normalized frame.
pub fn records_of(df: &DataFrame, limit: usize) -> Result<Vec<TransactionRecord>> {
    let head = df.head(Some(limit));

    let invoice_no = frame::string_values(&head, INVOICE_NO)?;
    let stock_code = frame::string_values(&head, STOCK_CODE)?;
    let description = frame::string_values(&head, DESCRIPTION)?;
    let customer_id = frame::string_values(&head, CUSTOMER_ID)?;
    let country = frame::string_values(&head, COUNTRY)?;
    let invoice_date = frame::i64_values(&head, INVOICE_DATE)?;
    let month = if head.column(MONTH).is_ok() {
        frame::i64_values(&head, MONTH)?
    } else {
        vec![None; head.height()]
    };
    let quantity = frame::f64_values_or_zero(&head, QUANTITY)?;
    let unit_price = frame::f64_values_or_zero(&head, UNIT_PRICE)?;
    let revenue = frame::f64_values_or_zero(&head, REVENUE)?;
    let cost = frame::f64_values_or_zero(&head, COST)?;
    let profit = frame::f64_values_or_zero(&head, PROFIT)?;

    let records = (0..head.height())
        .map(|i| TransactionRecord {
            invoice_no: invoice_no[i].clone(),
            stock_code: stock_code[i].clone(),
            description: description[i].clone(),
            quantity: quantity[i],
            invoice_date: invoice_date[i].and_then(time::millis_to_datetime),
            unit_price: unit_price[i],
            customer_id: customer_id[i].clone(),
            country: country[i].clone(),
            revenue: revenue[i],
            cost: cost[i],
            profit: profit[i],
            month: month[i].and_then(|days| time::epoch_days_to_date(days as i32)),
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::normalize;
    use crate::source::{RawCell, RawSheet};

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    fn sheet() -> RawSheet {
        let headers = [
            INVOICE_NO, STOCK_CODE, DESCRIPTION, QUANTITY, INVOICE_DATE, UNIT_PRICE,
            CUSTOMER_ID, COUNTRY, REVENUE, COST, PROFIT,
        ];
        let row = |inv: &str, date: &str, country: &str| {
            vec![
                text(inv),
                text("85123A"),
                text("WHITE HANGING HEART T-LIGHT HOLDER"),
                text("6"),
                text(date),
                text("2.55"),
                text("17850"),
                text(country),
                text("15.3"),
                text("10.0"),
                text("5.3"),
            ]
        };
        RawSheet {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: vec![
                row("536365", "2010-12-01 08:26:00", "United Kingdom"),
                row("536366", "2011-03-09 10:00:00", "France"),
                row("536367", "2010-12-05 12:00:00", "United Kingdom"),
                row("536368", "garbage", "EIRE"),
            ],
        }
    }

    #[test]
    fn test_date_bounds_skip_unparseable() {
        let table = normalize(&sheet(), Path::new("memory.csv")).unwrap();
        let (lo, hi) = table.date_bounds().unwrap().unwrap();
        assert_eq!(lo.to_string(), "2010-12-01 08:26:00");
        assert_eq!(hi.to_string(), "2011-03-09 10:00:00");
    }

    #[test]
    fn test_countries_by_frequency() {
        let table = normalize(&sheet(), Path::new("memory.csv")).unwrap();
        let ranked = table.countries_by_frequency().unwrap();
        assert_eq!(
            ranked,
            vec![
                ("United Kingdom".to_string(), 2),
                ("EIRE".to_string(), 1),
                ("France".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_records_and_required_columns() {
        let table = normalize(&sheet(), Path::new("memory.csv")).unwrap();
        let records = table.records(2).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].invoice_no.as_deref(), Some("536365"));
        assert_eq!(records[0].quantity, 6.0);
        assert_eq!(records[0].month, NaiveDate::from_ymd_opt(2010, 12, 1));

        assert!(table.require_columns(&[REVENUE, PROFIT]).is_ok());
        assert!(matches!(
            table.require_columns(&["Discount"]),
            Err(DashboardError::MissingColumn { .. })
        ));
    }
}
