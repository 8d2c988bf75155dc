//! Scalar KPIs over the filtered rows.

use crate::error::Result;
use crate::frame;
use crate::schema::{INVOICE_NO, PROFIT, REVENUE};
use polars::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_profit: f64,
    /// Distinct invoice numbers.
    pub total_orders: u64,
    /// Revenue per order; 0 when there are no orders.
    pub avg_order_value: f64,
    /// Profit over revenue; 0 when revenue is 0.
    pub profit_margin: f64,
}

impl Kpis {
    pub fn from_totals(total_revenue: f64, total_profit: f64, total_orders: u64) -> Self {
        let avg_order_value = if total_orders > 0 {
            total_revenue / total_orders as f64
        } else {
            0.0
        };
        let profit_margin = if total_revenue != 0.0 {
            total_profit / total_revenue
        } else {
            0.0
        };

        Self {
            total_revenue,
            total_profit,
            total_orders,
            avg_order_value,
            profit_margin,
        }
    }
}

pub fn compute(filtered: &DataFrame) -> Result<Kpis> {
    let totals = filtered
        .clone()
        .lazy()
        .select([
            col(REVENUE).sum().alias("total_revenue"),
            col(PROFIT).sum().alias("total_profit"),
            col(INVOICE_NO).drop_nulls().n_unique().alias("total_orders"),
        ])
        .collect()?;

    Ok(Kpis::from_totals(
        frame::scalar_f64(&totals, "total_revenue")?,
        frame::scalar_f64(&totals, "total_profit")?,
        frame::scalar_u64(&totals, "total_orders")?,
    ))
}
