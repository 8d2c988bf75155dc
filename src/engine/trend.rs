//! Monthly revenue and profit trend.

use crate::error::Result;
use crate::frame;
use crate::schema::{INVOICE_DATE, PROFIT, REVENUE};
use crate::time;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// First day of the month.
    pub month: NaiveDate,
    /// `YYYY-MM`
    pub label: String,
    pub revenue: f64,
    pub profit: f64,
}

/// Calendar-month buckets of `InvoiceDate`, ascending.
///
/// The series is contiguous from the first to the last month with data;
/// months in between without rows are reported with zero totals.
pub fn monthly(filtered: &DataFrame) -> Result<Vec<MonthlyPoint>> {
    let grouped = filtered
        .clone()
        .lazy()
        .filter(col(INVOICE_DATE).is_not_null())
        .group_by([
            col(INVOICE_DATE).dt().year().cast(DataType::Int32).alias("bucket_year"),
            col(INVOICE_DATE).dt().month().cast(DataType::Int32).alias("bucket_month"),
        ])
        .agg([
            col(REVENUE).sum().alias(REVENUE),
            col(PROFIT).sum().alias(PROFIT),
        ])
        .collect()?;

    let years = frame::i64_values(&grouped, "bucket_year")?;
    let months = frame::i64_values(&grouped, "bucket_month")?;
    let revenue = frame::f64_values(&grouped, REVENUE)?;
    let profit = frame::f64_values(&grouped, PROFIT)?;

    let mut buckets: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for i in 0..grouped.height() {
        if let (Some(year), Some(month)) = (years[i], months[i]) {
            buckets.insert((year as i32, month as u32), (revenue[i], profit[i]));
        }
    }

    let (first, last) = match (buckets.keys().next(), buckets.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Ok(Vec::new()),
    };

    let mut points = Vec::with_capacity(buckets.len());
    let mut cursor = first;
    while cursor <= last {
        let (year, month) = cursor;
        let (revenue, profit) = buckets.get(&cursor).copied().unwrap_or((0.0, 0.0));
        if let Some(start) = NaiveDate::from_ymd_opt(year, month, 1) {
            points.push(MonthlyPoint {
                month: start,
                label: time::month_label(year, month),
                revenue,
                profit,
            });
        }
        cursor = time::next_month(year, month);
    }

    Ok(points)
}
