//! Extraction of plain vectors from polars frames.
//!
//! Categorical columns may arrive as strings, booleans or numbers depending
//! on how the table was serialised, so grouping always goes through the
//! string form of a value.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use csi_core::CsiError;
use polars::prelude::*;

/// Look up `name`, reporting an absent column as [`CsiError::MissingColumn`].
pub fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map_err(|_| CsiError::MissingColumn(name.to_string()).into())
}

fn as_strings(df: &DataFrame, name: &str) -> Result<Series> {
    column(df, name)?
        .cast(&DataType::Utf8)
        .with_context(|| format!("casting {name} to strings"))
}

fn as_floats(df: &DataFrame, name: &str) -> Result<Series> {
    column(df, name)?
        .cast(&DataType::Float64)
        .with_context(|| format!("casting {name} to Float64"))
}

/// Frequency of each non-null value of `name`, most frequent first; ties
/// are ordered by label.
pub fn value_counts(df: &DataFrame, name: &str) -> Result<Vec<(String, usize)>> {
    let strings = as_strings(df, name)?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in strings.utf8()?.into_iter().flatten() {
        *counts.entry(value).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, n)| (label.to_string(), n))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(counts)
}

/// Finite values of a numeric column; nulls, NaN and unparseable strings
/// are skipped.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let floats = as_floats(df, name)?;
    let values = floats
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    Ok(values)
}

/// Values of `value` split by the string form of `by`, groups ordered by
/// label. Rows where either side is missing are skipped.
pub fn grouped_values(df: &DataFrame, value: &str, by: &str) -> Result<Vec<(String, Vec<f64>)>> {
    let values = as_floats(df, value)?;
    let keys = as_strings(df, by)?;
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (key, v) in keys.utf8()?.into_iter().zip(values.f64()?.into_iter()) {
        if let (Some(key), Some(v)) = (key, v) {
            if v.is_finite() {
                groups.entry(key.to_string()).or_default().push(v);
            }
        }
    }
    Ok(groups.into_iter().collect())
}

/// Row-aligned `(x, y)` pairs where both values are finite.
pub fn paired_values(df: &DataFrame, x: &str, y: &str) -> Result<(Vec<f64>, Vec<f64>)> {
    let xs = as_floats(df, x)?;
    let ys = as_floats(df, y)?;
    let mut out_x = Vec::with_capacity(df.height());
    let mut out_y = Vec::with_capacity(df.height());
    for (a, b) in xs.f64()?.into_iter().zip(ys.f64()?.into_iter()) {
        if let (Some(a), Some(b)) = (a, b) {
            if a.is_finite() && b.is_finite() {
                out_x.push(a);
                out_y.push(b);
            }
        }
    }
    Ok((out_x, out_y))
}
