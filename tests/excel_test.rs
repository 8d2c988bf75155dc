use chrono::NaiveDate;
use ecom_dashboard::filter::FilterSpec;
use ecom_dashboard::loader::read_table;
use ecom_dashboard::schema::*;
use ecom_dashboard::{apply, load, DashboardError, LoadOptions};
use rust_xlsxwriter::{Format, Workbook};
use std::path::PathBuf;

const HEADERS: [&str; 11] = [
    INVOICE_NO, STOCK_CODE, DESCRIPTION, QUANTITY, INVOICE_DATE, UNIT_PRICE, CUSTOMER_ID, COUNTRY,
    REVENUE, COST, PROFIT,
];

fn timestamp(y: i32, m: u32, d: u32, h: u32, mi: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
}

/// Workbook with a `data` sheet of two transactions and an unrelated second sheet.
/// Invoice dates are Excel serials under a date number format, as Excel stores them.
fn write_workbook() -> Result<(tempfile::TempDir, PathBuf), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("E-Commerce_UK_DATASET.xlsx");

    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm");

    let data = workbook.add_worksheet();
    data.set_name("data")?;
    for (col, header) in HEADERS.iter().enumerate() {
        data.write_string(0, col as u16, *header)?;
    }

    // 40513.25 is 2010-12-01 06:00, 40558.5 is 2011-01-15 12:00
    let rows: [(&str, &str, &str, f64, f64, f64, f64, &str, f64, f64, f64); 2] = [
        ("536365", "85123A", "WHITE HANGING HEART T-LIGHT HOLDER", 6.0, 40513.25, 2.55, 17850.0, "United Kingdom", 15.30, 10.71, 4.59),
        ("541431", "23166", "MEDIUM CERAMIC TOP STORAGE JAR", 10.0, 40558.5, 1.04, 12346.0, "United Kingdom", 10.40, 7.28, 3.12),
    ];
    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        data.write_string(r, 0, row.0)?;
        data.write_string(r, 1, row.1)?;
        data.write_string(r, 2, row.2)?;
        data.write_number(r, 3, row.3)?;
        data.write_number_with_format(r, 4, row.4, &date_format)?;
        data.write_number(r, 5, row.5)?;
        data.write_number(r, 6, row.6)?;
        data.write_string(r, 7, row.7)?;
        data.write_number(r, 8, row.8)?;
        data.write_number(r, 9, row.9)?;
        data.write_number(r, 10, row.10)?;
    }

    let notes = workbook.add_worksheet();
    notes.set_name("notes")?;
    notes.write_string(0, 0, "exported from the shop backend")?;

    workbook.save(&path)?;
    Ok((dir, path))
}

#[test]
fn test_load_data_worksheet() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = write_workbook()?;
    let table = load(&path)?;

    assert_eq!(table.height(), 2);
    let records = table.records(10)?;

    assert_eq!(records[0].invoice_no.as_deref(), Some("536365"));
    assert_eq!(records[0].stock_code.as_deref(), Some("85123A"));
    // numeric customer cells render without a trailing ".0"
    assert_eq!(records[0].customer_id.as_deref(), Some("17850"));
    assert_eq!(records[1].customer_id.as_deref(), Some("12346"));

    assert_eq!(records[0].invoice_date, Some(timestamp(2010, 12, 1, 6, 0)));
    assert_eq!(records[1].invoice_date, Some(timestamp(2011, 1, 15, 12, 0)));
    assert_eq!(records[0].month, NaiveDate::from_ymd_opt(2010, 12, 1));
    assert_eq!(records[1].month, NaiveDate::from_ymd_opt(2011, 1, 1));

    assert_eq!(records[0].quantity, 6.0);
    assert_eq!(records[0].revenue, 15.30);

    let spec = FilterSpec::defaults_for(&table)?;
    assert_eq!(spec.date_start, NaiveDate::from_ymd_opt(2010, 12, 1).unwrap());
    assert_eq!(spec.date_end, NaiveDate::from_ymd_opt(2011, 1, 15).unwrap());

    let result = apply(&table, &spec, 10)?;
    assert_eq!(result.kpis.total_orders, 2);
    assert!((result.kpis.total_revenue - 25.70).abs() < 1e-9);
    let labels: Vec<&str> = result.monthly_trend.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["2010-12", "2011-01"]);
    Ok(())
}

#[test]
fn test_missing_worksheet_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = write_workbook()?;

    match read_table(&path, &LoadOptions::with_sheet("Sheet1")) {
        Err(DashboardError::SheetNotFound { sheet, .. }) => assert_eq!(sheet, "Sheet1"),
        other => panic!("expected missing sheet, got {:?}", other.map(|t| t.height())),
    }
    Ok(())
}

#[test]
fn test_sheet_without_transactions_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, path) = write_workbook()?;

    let result = read_table(&path, &LoadOptions::with_sheet("notes"));
    assert!(matches!(result, Err(DashboardError::MissingColumn { .. })));
    Ok(())
}
