//! Column extraction from polars frames into plain Rust values.

use crate::error::Result;
use polars::prelude::*;

pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name)?.cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Float column; nulls read as 0.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    let values = series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    Ok(values)
}

/// Float column if present, zeros otherwise.
pub fn f64_values_or_zero(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    if df.column(name).is_err() {
        return Ok(vec![0.0; df.height()]);
    }
    f64_values(df, name)
}

pub fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = df.column(name)?.cast(&DataType::Int64)?;
    let values = series.i64()?.into_iter().collect();
    Ok(values)
}

/// Count column; nulls read as 0.
pub fn u64_values(df: &DataFrame, name: &str) -> Result<Vec<u64>> {
    let series = df.column(name)?.cast(&DataType::UInt64)?;
    let values = series
        .u64()?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect();
    Ok(values)
}

pub fn scalar_f64(df: &DataFrame, name: &str) -> Result<f64> {
    Ok(f64_values(df, name)?.first().copied().unwrap_or(0.0))
}

pub fn scalar_u64(df: &DataFrame, name: &str) -> Result<u64> {
    Ok(u64_values(df, name)?.first().copied().unwrap_or(0))
}
