//! Calendar helpers shared by the loader, the filter and the monthly trend.
//!
//! Timestamps are stored as milliseconds since the Unix epoch (no time zone),
//! matching the `Datetime(ms)` column of the normalized table.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: i64 = 86_400_000;

pub fn datetime_to_millis(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

pub fn millis_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

pub fn date_to_epoch_days(date: NaiveDate) -> i32 {
    day_start_millis(date).div_euclid(MILLIS_PER_DAY) as i32
}

pub fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    millis_to_datetime(days as i64 * MILLIS_PER_DAY).map(|dt| dt.date())
}

/// First day of the calendar month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Midnight at the start of `date`.
pub fn day_start_millis(date: NaiveDate) -> i64 {
    datetime_to_millis(date.and_time(chrono::NaiveTime::MIN))
}

/// Midnight after `date`, so that `[start, end)` covers the whole day.
pub fn day_end_exclusive_millis(date: NaiveDate) -> i64 {
    date.succ_opt().map(day_start_millis).unwrap_or(i64::MAX)
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// `YYYY-MM`
pub fn month_label(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}
