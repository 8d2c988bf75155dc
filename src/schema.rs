//! Column catalogue for the transactions sheet.
//!
//! Names are exact-match and case-sensitive against the source header row.

pub const INVOICE_NO: &str = "InvoiceNo";
pub const STOCK_CODE: &str = "StockCode";
pub const DESCRIPTION: &str = "Description";
pub const QUANTITY: &str = "Quantity";
pub const INVOICE_DATE: &str = "InvoiceDate";
pub const UNIT_PRICE: &str = "UnitPrice";
pub const CUSTOMER_ID: &str = "CustomerID";
pub const COUNTRY: &str = "Country";
pub const REVENUE: &str = "Revenue";
pub const COST: &str = "Cost";
pub const PROFIT: &str = "Profit";

/// Derived first-of-month bucket of `InvoiceDate`.
pub const MONTH: &str = "Month";

/// Columns whose absence makes the source unusable.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    INVOICE_NO,
    STOCK_CODE,
    DESCRIPTION,
    INVOICE_DATE,
    CUSTOMER_ID,
    COUNTRY,
];

/// Columns coerced to numbers on load; unparseable values become 0.
pub const NUMERIC_COLUMNS: [&str; 5] = [QUANTITY, UNIT_PRICE, REVENUE, COST, PROFIT];

pub fn is_numeric(column: &str) -> bool {
    NUMERIC_COLUMNS.contains(&column)
}
