//! Top-N rankings: products, countries and customers by revenue.
//!
//! Rankings sort by revenue descending. Equal revenues keep ascending key
//! order. Rows whose grouping key is null are left out of that ranking.

use crate::error::Result;
use crate::frame;
use crate::schema::{COUNTRY, CUSTOMER_ID, DESCRIPTION, INVOICE_NO, PROFIT, QUANTITY, REVENUE, STOCK_CODE};
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

/// Fixed size of the revenue-by-country ranking.
pub const COUNTRY_LIMIT: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRank {
    pub stock_code: String,
    pub description: String,
    pub revenue: f64,
    pub profit: f64,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRevenue {
    pub country: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRank {
    pub customer_id: String,
    pub revenue: f64,
    /// Distinct invoices of this customer.
    pub orders: u64,
}

fn rank_by_revenue<T>(
    rows: &mut Vec<T>,
    limit: usize,
    revenue: impl Fn(&T) -> f64,
    key: impl Fn(&T, &T) -> Ordering,
) {
    rows.sort_by(|a, b| revenue(b).total_cmp(&revenue(a)).then_with(|| key(a, b)));
    rows.truncate(limit);
}

/// Customer ids order numerically when both parse as numbers, else as text.
fn compare_customer_ids(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

pub fn top_products(filtered: &DataFrame, top_n: usize) -> Result<Vec<ProductRank>> {
    let grouped = filtered
        .clone()
        .lazy()
        .filter(col(STOCK_CODE).is_not_null().and(col(DESCRIPTION).is_not_null()))
        .group_by([col(STOCK_CODE), col(DESCRIPTION)])
        .agg([
            col(REVENUE).sum().alias(REVENUE),
            col(PROFIT).sum().alias(PROFIT),
            col(QUANTITY).sum().alias(QUANTITY),
        ])
        .collect()?;

    let codes = frame::string_values(&grouped, STOCK_CODE)?;
    let descriptions = frame::string_values(&grouped, DESCRIPTION)?;
    let revenue = frame::f64_values(&grouped, REVENUE)?;
    let profit = frame::f64_values(&grouped, PROFIT)?;
    let quantity = frame::f64_values(&grouped, QUANTITY)?;

    let mut rows: Vec<ProductRank> = (0..grouped.height())
        .map(|i| ProductRank {
            stock_code: codes[i].clone().unwrap_or_default(),
            description: descriptions[i].clone().unwrap_or_default(),
            revenue: revenue[i],
            profit: profit[i],
            quantity: quantity[i],
        })
        .collect();

    rank_by_revenue(&mut rows, top_n, |r| r.revenue, |a, b| {
        a.stock_code
            .cmp(&b.stock_code)
            .then_with(|| a.description.cmp(&b.description))
    });
    Ok(rows)
}

pub fn revenue_by_country(filtered: &DataFrame) -> Result<Vec<CountryRevenue>> {
    let grouped = filtered
        .clone()
        .lazy()
        .filter(col(COUNTRY).is_not_null())
        .group_by([col(COUNTRY)])
        .agg([col(REVENUE).sum().alias(REVENUE)])
        .collect()?;

    let countries = frame::string_values(&grouped, COUNTRY)?;
    let revenue = frame::f64_values(&grouped, REVENUE)?;

    let mut rows: Vec<CountryRevenue> = countries
        .into_iter()
        .zip(revenue)
        .map(|(country, revenue)| CountryRevenue {
            country: country.unwrap_or_default(),
            revenue,
        })
        .collect();

    rank_by_revenue(&mut rows, COUNTRY_LIMIT, |r| r.revenue, |a, b| a.country.cmp(&b.country));
    Ok(rows)
}

pub fn top_customers(filtered: &DataFrame, top_n: usize) -> Result<Vec<CustomerRank>> {
    let grouped = filtered
        .clone()
        .lazy()
        .filter(col(CUSTOMER_ID).is_not_null())
        .group_by([col(CUSTOMER_ID)])
        .agg([
            col(REVENUE).sum().alias(REVENUE),
            col(INVOICE_NO).drop_nulls().n_unique().alias("orders"),
        ])
        .collect()?;

    let customers = frame::string_values(&grouped, CUSTOMER_ID)?;
    let revenue = frame::f64_values(&grouped, REVENUE)?;
    let orders = frame::u64_values(&grouped, "orders")?;

    let mut rows: Vec<CustomerRank> = (0..grouped.height())
        .map(|i| CustomerRank {
            customer_id: customers[i].clone().unwrap_or_default(),
            revenue: revenue[i],
            orders: orders[i],
        })
        .collect();

    rank_by_revenue(&mut rows, top_n, |r| r.revenue, |a, b| {
        compare_customer_ids(&a.customer_id, &b.customer_id)
    });
    Ok(rows)
}
