//! Filter-Aggregate Engine
//!
//! `apply` is a pure function of the table, the filter spec and top-N: it
//! never touches the table it is given and keeps no state between calls.

pub mod kpi;
pub mod rankings;
pub mod trend;

pub use kpi::Kpis;
pub use rankings::{CountryRevenue, CustomerRank, ProductRank, COUNTRY_LIMIT};
pub use trend::MonthlyPoint;

use crate::error::Result;
use crate::filter::FilterSpec;
use crate::schema::{COUNTRY, INVOICE_DATE, PROFIT, QUANTITY, REVENUE};
use crate::table::Table;
use crate::time;
use polars::prelude::*;
use tracing::debug;

/// Everything the presentation layer needs for one filter selection.
#[derive(Debug, Clone)]
pub struct FilteredResult {
    /// Filtered rows, in table order.
    pub filtered: DataFrame,
    pub kpis: Kpis,
    pub monthly_trend: Vec<MonthlyPoint>,
    pub top_products: Vec<ProductRank>,
    pub revenue_by_country: Vec<CountryRevenue>,
    pub top_customers: Vec<CustomerRank>,
}

impl FilteredResult {
    pub fn row_count(&self) -> usize {
        self.filtered.height()
    }
}

/// Filter the table and compute KPIs plus the four result tables.
pub fn apply(table: &Table, spec: &FilterSpec, top_n: usize) -> Result<FilteredResult> {
    spec.validate()?;
    table.require_columns(&[REVENUE, PROFIT, QUANTITY])?;

    let filtered = filter_rows(table, spec)?;
    debug!(
        "Filter kept {} of {} rows ({} to {}, {} countries)",
        filtered.height(),
        table.height(),
        spec.date_start,
        spec.date_end,
        spec.countries.len()
    );

    let kpis = kpi::compute(&filtered)?;
    let monthly_trend = trend::monthly(&filtered)?;
    let top_products = rankings::top_products(&filtered, top_n)?;
    let revenue_by_country = rankings::revenue_by_country(&filtered)?;
    let top_customers = rankings::top_customers(&filtered, top_n)?;

    Ok(FilteredResult {
        filtered,
        kpis,
        monthly_trend,
        top_products,
        revenue_by_country,
        top_customers,
    })
}

/// Rows with `date_start <= InvoiceDate <= date_end` (whole end day) and, when
/// countries are selected, a matching country. Undated rows never match.
pub fn filter_rows(table: &Table, spec: &FilterSpec) -> Result<DataFrame> {
    let start = time::day_start_millis(spec.date_start);
    let end = time::day_end_exclusive_millis(spec.date_end);

    let stamp = col(INVOICE_DATE).cast(DataType::Int64);
    let mut predicate = stamp.clone().gt_eq(lit(start)).and(stamp.lt(lit(end)));

    if spec.restricts_countries() {
        let allowed: Vec<String> = spec.countries.iter().cloned().collect();
        predicate = predicate.and(col(COUNTRY).is_in(lit(Series::new("countries", allowed))));
    }

    let filtered = table.frame().clone().lazy().filter(predicate).collect()?;
    Ok(filtered)
}
