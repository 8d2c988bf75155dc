//! Display formatting for KPI values.

use crate::engine::Kpis;
use num_format::{Locale, ToFormattedString};
use serde::Serialize;

/// Fixed-point number with thousands separators, e.g. `-1,234.50`.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let negative = value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    match int_part.parse::<u128>() {
        Ok(whole) => out.push_str(&whole.to_formatted_string(&Locale::en)),
        Err(_) => out.push_str(int_part),
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `£` + thousands separators + 2 decimals.
pub fn format_currency(value: f64) -> String {
    format!("£{}", format_grouped(value, 2))
}

/// Ratio as a percentage with 2 decimals, e.g. `0.1` -> `10.00%`.
pub fn format_percent(ratio: f64) -> String {
    format!("{}%", format_grouped(ratio * 100.0, 2))
}

pub fn format_count(count: u64) -> String {
    count.to_formatted_string(&Locale::en)
}

/// KPI strings as shown on the dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedKpis {
    pub total_revenue: String,
    pub total_profit: String,
    pub total_orders: String,
    pub avg_order_value: String,
    pub profit_margin: String,
}

impl From<&Kpis> for FormattedKpis {
    fn from(kpis: &Kpis) -> Self {
        Self {
            total_revenue: format_currency(kpis.total_revenue),
            total_profit: format_currency(kpis.total_profit),
            total_orders: format_count(kpis.total_orders),
            avg_order_value: format_currency(kpis.avg_order_value),
            profit_margin: format_percent(kpis.profit_margin),
        }
    }
}
