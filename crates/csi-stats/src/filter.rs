//! The narrowing chain applied to the raw table: categorical filters,
//! year coercion, missing-value removal and percentile trimming.
//!
//! Each step takes the previous frame by reference and returns a new one,
//! so the loaded table and every intermediate stay available to callers.

use anyhow::{Context, Result};
use csi_core::{
    columns::{
        APP_STATUS, COMPLETED, INSTALLED, INST_STATUS, NAMEPLATE, RESIDENTIAL, SECTOR, TOTAL_COST,
        YEAR,
    },
    units::{Dollars, Kilowatts},
    CsiError,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::frame::{column, numeric_values};
use crate::quantile::quantile;

/// Equality predicates selecting the projects under study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub sector: String,
    pub app_status: String,
    pub inst_status: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            sector: RESIDENTIAL.to_string(),
            app_status: COMPLETED.to_string(),
            inst_status: INSTALLED.to_string(),
        }
    }
}

impl FilterCriteria {
    /// `(column, value)` pairs in application order.
    pub fn predicates(&self) -> [(&'static str, &str); 3] {
        [
            (SECTOR, self.sector.as_str()),
            (APP_STATUS, self.app_status.as_str()),
            (INST_STATUS, self.inst_status.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterStep {
    pub column: String,
    pub value: String,
    /// Rows remaining after this step.
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterReport {
    pub original: usize,
    pub steps: Vec<FilterStep>,
}

impl FilterReport {
    pub fn remaining(&self) -> usize {
        self.steps.last().map_or(self.original, |s| s.rows)
    }

    pub fn removed(&self) -> usize {
        self.original - self.remaining()
    }
}

/// Keep rows matching every predicate of `criteria`, in order.
pub fn apply_filters(
    df: &DataFrame,
    criteria: &FilterCriteria,
) -> Result<(DataFrame, FilterReport)> {
    let mut current = df.clone();
    let mut steps = Vec::with_capacity(3);
    for (name, value) in criteria.predicates() {
        column(&current, name)?;
        current = current
            .lazy()
            .filter(col(name).cast(DataType::Utf8).eq(lit(value)))
            .collect()
            .with_context(|| format!("filtering {name} == {value:?}"))?;
        debug!("{} == {:?}: {} rows", name, value, current.height());
        steps.push(FilterStep {
            column: name.to_string(),
            value: value.to_string(),
            rows: current.height(),
        });
    }
    let report = FilterReport {
        original: df.height(),
        steps,
    };
    info!(
        "Filtered {} records down to {}",
        report.original,
        report.remaining()
    );
    Ok((current, report))
}

/// Replace `year` with its Int64 form. Fractional years truncate; a missing
/// or non-numeric year is a [`CsiError::Validation`] error.
pub fn coerce_year(df: &DataFrame) -> Result<DataFrame> {
    let year = column(df, YEAR)?;
    let numeric = if year.dtype() == &DataType::Utf8 {
        year.cast(&DataType::Float64)?
    } else {
        year.clone()
    };
    let coerced = numeric
        .cast(&DataType::Int64)
        .context("casting year to Int64")?;
    let invalid = coerced.null_count();
    if invalid > 0 {
        return Err(CsiError::Validation(format!(
            "{invalid} of {} year values are missing or not numeric",
            coerced.len()
        ))
        .into());
    }
    let mut out = df.clone();
    out.with_column(coerced)?;
    Ok(out)
}

/// Drop rows where any of the numeric `columns` is null or NaN. Returns the
/// new frame and the number of rows removed.
pub fn drop_missing(df: &DataFrame, columns: &[&str]) -> Result<(DataFrame, usize)> {
    for name in columns {
        column(df, name)?;
    }
    let present = columns
        .iter()
        .map(|name| {
            col(name)
                .is_not_null()
                .and(col(name).cast(DataType::Float64).is_not_nan())
        })
        .reduce(|a, b| a.and(b));
    let out = match present {
        Some(mask) => df
            .clone()
            .lazy()
            .filter(mask)
            .collect()
            .context("dropping rows with missing values")?,
        None => df.clone(),
    };
    let dropped = df.height() - out.height();
    info!("Dropped {} rows missing {:?}", dropped, columns);
    Ok((out, dropped))
}

/// Upper cut-offs for nameplate capacity and total cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierThresholds {
    pub quantile: f64,
    pub nameplate: Kilowatts,
    pub total_cost: Dollars,
}

pub fn outlier_thresholds(df: &DataFrame, q: f64) -> Result<OutlierThresholds> {
    if !(0.0..=1.0).contains(&q) {
        return Err(CsiError::Validation(format!("quantile {q} is outside [0, 1]")).into());
    }
    let nameplate = quantile(&numeric_values(df, NAMEPLATE)?, q)
        .ok_or_else(|| CsiError::EmptySelection(format!("no {NAMEPLATE} values to threshold")))?;
    let total_cost = quantile(&numeric_values(df, TOTAL_COST)?, q)
        .ok_or_else(|| CsiError::EmptySelection(format!("no {TOTAL_COST} values to threshold")))?;
    Ok(OutlierThresholds {
        quantile: q,
        nameplate: Kilowatts(nameplate),
        total_cost: Dollars(total_cost),
    })
}

/// Keep rows at or below both thresholds.
pub fn trim_outliers(df: &DataFrame, thresholds: &OutlierThresholds) -> Result<DataFrame> {
    column(df, NAMEPLATE)?;
    column(df, TOTAL_COST)?;
    let out = df
        .clone()
        .lazy()
        .filter(
            col(NAMEPLATE)
                .lt_eq(lit(thresholds.nameplate.value()))
                .and(col(TOTAL_COST).lt_eq(lit(thresholds.total_cost.value()))),
        )
        .collect()
        .context("trimming outliers")?;
    info!(
        "Trimmed to {} rows at or below {} and {}",
        out.height(),
        thresholds.nameplate,
        thresholds.total_cost
    );
    Ok(out)
}

/// Keep rows with `year <= last_year`.
pub fn through_year(df: &DataFrame, last_year: i64) -> Result<DataFrame> {
    column(df, YEAR)?;
    df.clone()
        .lazy()
        .filter(col(YEAR).lt_eq(lit(last_year)))
        .collect()
        .with_context(|| format!("selecting years up to {last_year}"))
}
