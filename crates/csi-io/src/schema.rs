//! Column-level overview of a loaded table: name, non-null count and dtype
//! for every column, the same view a dataframe `info()` call prints.

use anyhow::Result;
use csi_core::CsiError;
use polars::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaSummary {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
}

impl SchemaSummary {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub fn describe_schema(df: &DataFrame) -> SchemaSummary {
    let columns = df
        .get_columns()
        .iter()
        .map(|series| ColumnInfo {
            name: series.name().to_string(),
            non_null: series.len() - series.null_count(),
            dtype: series.dtype().to_string(),
        })
        .collect();
    SchemaSummary {
        rows: df.height(),
        columns,
    }
}

/// Fail with [`CsiError::MissingColumn`] for the first name not in `df`.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    let present = df.get_column_names();
    for name in names {
        if !present.contains(name) {
            return Err(CsiError::MissingColumn(name.to_string()).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df![
            "sector" => &[Some("Residential"), Some("Commercial"), None],
            "nameplate" => &[Some(5.0f64), None, None],
            "year" => &[2008i64, 2009, 2010],
        ]
        .unwrap()
    }

    #[test]
    fn counts_non_null_values_per_column() {
        let summary = describe_schema(&sample());
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns.len(), 3);
        assert_eq!(summary.column("sector").unwrap().non_null, 2);
        assert_eq!(summary.column("nameplate").unwrap().non_null, 1);
        assert_eq!(summary.column("year").unwrap().non_null, 3);
        assert_eq!(summary.column("year").unwrap().dtype, "i64");
    }

    #[test]
    fn require_columns_names_the_missing_one() {
        let df = sample();
        assert!(require_columns(&df, &["sector", "year"]).is_ok());
        let err = require_columns(&df, &["sector", "total_cost", "type"]).unwrap_err();
        match err.downcast_ref::<CsiError>() {
            Some(CsiError::MissingColumn(name)) => assert_eq!(name, "total_cost"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
