//! Presentation payload
//!
//! Bundles one engine run into a serializable view: raw and formatted KPIs,
//! the four result tables and a preview of the filtered rows. Rendering to
//! charts is left to whatever consumes the JSON; the text form is for the
//! terminal.

use crate::engine::{
    CountryRevenue, CustomerRank, FilteredResult, Kpis, MonthlyPoint, ProductRank,
};
use crate::error::Result;
use crate::filter::FilterSpec;
use crate::format::{format_count, format_currency, FormattedKpis};
use crate::table::{records_of, TransactionRecord};
use serde::Serialize;
use std::fmt::Write;

/// Rows shown in the raw data preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub source: String,
    pub filter: FilterSpec,
    pub top_n: usize,
    pub filtered_rows: usize,
    pub kpis: Kpis,
    pub formatted_kpis: FormattedKpis,
    pub monthly_trend: Vec<MonthlyPoint>,
    pub top_products: Vec<ProductRank>,
    pub revenue_by_country: Vec<CountryRevenue>,
    pub top_customers: Vec<CustomerRank>,
    pub preview: Vec<TransactionRecord>,
}

impl DashboardView {
    pub fn build(
        source: impl Into<String>,
        filter: &FilterSpec,
        top_n: usize,
        result: &FilteredResult,
        preview_rows: usize,
    ) -> Result<Self> {
        Ok(Self {
            source: source.into(),
            filter: filter.clone(),
            top_n,
            filtered_rows: result.row_count(),
            kpis: result.kpis,
            formatted_kpis: FormattedKpis::from(&result.kpis),
            monthly_trend: result.monthly_trend.clone(),
            top_products: result.top_products.clone(),
            revenue_by_country: result.revenue_by_country.clone(),
            top_customers: result.top_customers.clone(),
            preview: records_of(&result.filtered, preview_rows)?,
        })
    }
}

pub fn render_json(view: &DashboardView) -> Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

fn banner(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "=".repeat(80));
    let _ = writeln!(out, " {}", title);
    let _ = writeln!(out, "{}", "=".repeat(80));
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

pub fn render_text(view: &DashboardView) -> String {
    let mut out = String::new();

    banner(&mut out, "E-COMMERCE REVENUE & PROFIT DASHBOARD");
    let _ = writeln!(out, " Source:    {}", view.source);
    let _ = writeln!(
        out,
        " Dates:     {} to {}",
        view.filter.date_start, view.filter.date_end
    );
    let countries = if view.filter.countries.is_empty() {
        "all".to_string()
    } else {
        view.filter.countries.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    let _ = writeln!(out, " Countries: {}", countries);
    let _ = writeln!(out, " Rows:      {}", format_count(view.filtered_rows as u64));

    banner(&mut out, "KPIs");
    let k = &view.formatted_kpis;
    let _ = writeln!(out, "   Total Revenue:   {}", k.total_revenue);
    let _ = writeln!(out, "   Total Profit:    {}", k.total_profit);
    let _ = writeln!(out, "   Total Orders:    {}", k.total_orders);
    let _ = writeln!(out, "   Avg Order Value: {}", k.avg_order_value);
    let _ = writeln!(out, "   Profit Margin:   {}", k.profit_margin);

    banner(&mut out, "Monthly Revenue & Profit");
    for point in &view.monthly_trend {
        let _ = writeln!(
            out,
            "   {}  revenue {:>16}  profit {:>16}",
            point.label,
            format_currency(point.revenue),
            format_currency(point.profit)
        );
    }

    banner(&mut out, &format!("Top {} products by Revenue", view.top_n));
    for (i, p) in view.top_products.iter().enumerate() {
        let _ = writeln!(
            out,
            "   {:>2}. {:<10} {:<36} {:>14}  profit {:>12}  qty {}",
            i + 1,
            p.stock_code,
            p.description,
            format_currency(p.revenue),
            format_currency(p.profit),
            p.quantity
        );
    }

    banner(&mut out, "Revenue by Country");
    for (i, c) in view.revenue_by_country.iter().enumerate() {
        let _ = writeln!(
            out,
            "   {:>2}. {:<24} {:>16}",
            i + 1,
            c.country,
            format_currency(c.revenue)
        );
    }

    banner(&mut out, &format!("Top {} customers by Revenue", view.top_n));
    for (i, c) in view.top_customers.iter().enumerate() {
        let _ = writeln!(
            out,
            "   {:>2}. {:<12} {:>16}  orders {}",
            i + 1,
            c.customer_id,
            format_currency(c.revenue),
            format_count(c.orders)
        );
    }

    banner(
        &mut out,
        &format!("Underlying sample data (first {} rows)", view.preview.len()),
    );
    for r in &view.preview {
        let date = r
            .invoice_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "   {:<8} {:<8} {:<32} {:>6} {:<19} {:>8} {:<8} {:<16} {:>10} {:>10} {:>10}",
            opt(&r.invoice_no),
            opt(&r.stock_code),
            opt(&r.description),
            r.quantity,
            date,
            r.unit_price,
            opt(&r.customer_id),
            opt(&r.country),
            r.revenue,
            r.cost,
            r.profit
        );
    }

    out
}
