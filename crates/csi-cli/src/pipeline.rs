//! The end-to-end analysis: load, inspect, narrow the table to completed
//! residential installations, and render the chart set.
//!
//! Progress messages go to stdout with `println!` so a run reads like a
//! report; `tracing` carries the operational detail.

use std::cmp::Ordering;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csi_core::columns::{self, CATEGORICAL, NAMEPLATE, SIZE_AND_COST, THIRD_PARTY, TOTAL_COST, YEAR};
use csi_core::{CsiError, Dollars, Kilowatts};
use csi_io::{describe_schema, read_frame, require_columns, SchemaSummary};
use csi_stats::{
    apply_filters, coerce_year, drop_missing, grouped_values, numeric_values, outlier_thresholds,
    paired_values, quantile, through_year, trim_outliers, value_counts, BinRule, FilterReport,
    OutlierThresholds,
};
use csi_viz::{
    boxen_chart, count_chart, hexbin_joint, histogram_pair, hue_histogram, kde_overlay,
    split_violin, Figure, Orientation, Panel,
};
use polars::prelude::DataFrame;
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::info;

use crate::config::PipelineConfig;

/// What a run found and wrote.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub filter: FilterReport,
    pub dropped_missing: usize,
    pub thresholds: OutlierThresholds,
    pub trimmed_rows: usize,
    /// Rows kept for the by-year chart.
    pub through_year_rows: usize,
    pub median_cost_per_watt: Option<f64>,
    pub charts: Vec<PathBuf>,
}

/// Chart paths under the output directory, remembered in write order.
struct ChartSet {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl ChartSet {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            written: Vec::new(),
        }
    }

    fn path(&mut self, name: &str) -> PathBuf {
        let path = self.dir.join(name);
        self.written.push(path.clone());
        path
    }
}

pub fn run_pipeline(input: &Path, out_dir: &Path, config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    let dpi = config.render.dpi;
    let (standard, square, joint) = (Figure::standard(dpi), Figure::square(dpi), Figure::joint(dpi));
    let mut charts = ChartSet::new(out_dir);

    let pv = read_frame(input)?;
    require_columns(&pv, &columns::required())?;
    let categorical = inspect_table(&pv, io::stdout())?;
    for (var, counts) in &categorical {
        let path = charts.path(&format!("count_{var}.png"));
        count_chart(counts, var, &path, &square)
            .with_context(|| format!("rendering {}", path.display()))?;
    }

    let (res, filter) = apply_filters(&pv, &config.filter)?;
    println!("Number of original records: {}", filter.original);
    println!("Number of records after filtering: {}", filter.remaining());
    if res.height() == 0 {
        return Err(CsiError::EmptySelection(format!(
            "no records with sector={:?}, app_status={:?}, inst_status={:?}",
            config.filter.sector, config.filter.app_status, config.filter.inst_status
        ))
        .into());
    }

    let res = coerce_year(&res)?;
    for var in [THIRD_PARTY, YEAR] {
        let counts = ordered_by_value(value_counts(&res, var)?);
        let path = charts.path(&format!("res_{var}.png"));
        count_chart(&counts, var, &path, &square)
            .with_context(|| format!("rendering {}", path.display()))?;
    }

    let (res, dropped_missing) = drop_missing(&res, &SIZE_AND_COST)?;
    println!(
        "Number of dropped records with missing data for nameplate capacity and total cost: {}",
        dropped_missing
    );
    size_cost_histograms(&res, &charts.path("nameplate_cost_raw.png"), &standard)?;

    let thresholds = outlier_thresholds(&res, config.trim.quantile)?;
    let pct = percentile_label(thresholds.quantile);
    println!(
        "Completed CSI projects at or below the {pct} percentile in total cost: {}",
        thresholds.total_cost
    );
    println!(
        "Completed CSI projects at or below the {pct} percentile in size: {}",
        thresholds.nameplate
    );
    let trim = trim_outliers(&res, &thresholds)?;
    println!(
        "Number of CSI project records at or below the {pct} percentile in total cost or size: {}",
        trim.height()
    );
    size_cost_histograms(&trim, &charts.path("nameplate_cost.png"), &standard)?;

    for var in SIZE_AND_COST {
        let groups = grouped_values(&trim, var, THIRD_PARTY)?;
        let path = charts.path(&format!("res_{var}.png"));
        hue_histogram(var, THIRD_PARTY, &groups, &path, &standard)
            .with_context(|| format!("rendering {}", path.display()))?;
    }

    let by_party = grouped_values(&trim, NAMEPLATE, THIRD_PARTY)?;
    let path = charts.path("res_boxen_all.png");
    boxen_chart(
        &by_party,
        Orientation::Vertical,
        "Nameplate Capacity",
        "Third Party",
        "kW",
        &path,
        &standard,
    )
    .with_context(|| format!("rendering {}", path.display()))?;

    let path = charts.path("res_violin.png");
    split_violin(
        "Nameplate Capacity",
        &config.filter.inst_status,
        "kW",
        THIRD_PARTY,
        &by_party,
        &path,
        &standard,
    )
    .with_context(|| format!("rendering {}", path.display()))?;

    let path = charts.path("res_kde.png");
    kde_overlay("Nameplate Capacity", "kW", THIRD_PARTY, &by_party, &path, &standard)
        .with_context(|| format!("rendering {}", path.display()))?;

    let main = through_year(&trim, config.trim.last_year)?;
    let by_year = grouped_values(&main, NAMEPLATE, YEAR)?;
    let path = charts.path("res_boxen_year.png");
    boxen_chart(
        &by_year,
        Orientation::Horizontal,
        "Nameplate Capacity by Year",
        "Year",
        "kW",
        &path,
        &standard,
    )
    .with_context(|| format!("rendering {}", path.display()))?;

    let (kw, cost) = paired_values(&trim, NAMEPLATE, TOTAL_COST)?;
    let path = charts.path("res_hexbin.png");
    hexbin_joint(
        &kw,
        &cost,
        "Nameplate",
        "Total Cost",
        "Distribution of Systems by Cost and Capacity",
        &path,
        &joint,
    )
    .with_context(|| format!("rendering {}", path.display()))?;

    let per_watt = median_cost_per_watt(&kw, &cost);
    if let Some(per_watt) = per_watt {
        println!("Median installed cost per watt: ${per_watt:.2}");
    }

    info!("Wrote {} charts to {}", charts.written.len(), out_dir.display());
    Ok(PipelineReport {
        filter,
        dropped_missing,
        thresholds,
        trimmed_rows: trim.height(),
        through_year_rows: main.height(),
        median_cost_per_watt: per_watt,
        charts: charts.written,
    })
}

/// Print the schema overview and the value counts of every categorical
/// column, returning the counts for charting.
pub fn inspect_table<W: Write>(
    df: &DataFrame,
    mut out: W,
) -> Result<Vec<(&'static str, Vec<(String, usize)>)>> {
    writeln!(
        out,
        "Column name, non-null value count, and datatype per CSI application record:"
    )?;
    write_schema(&mut out, &describe_schema(df))?;
    let mut all = Vec::with_capacity(CATEGORICAL.len());
    for var in CATEGORICAL {
        let counts = value_counts(df, var)?;
        writeln!(out, "{var}")?;
        write_counts(&mut out, &counts)?;
        all.push((var, counts));
    }
    Ok(all)
}

pub fn write_schema<W: Write>(out: W, summary: &SchemaSummary) -> io::Result<()> {
    let mut writer = TabWriter::new(out);
    writeln!(writer, "{} entries, {} columns", summary.rows, summary.columns.len())?;
    writeln!(writer, "#\tCOLUMN\tNON-NULL\tDTYPE")?;
    for (i, info) in summary.columns.iter().enumerate() {
        writeln!(writer, "{}\t{}\t{}\t{}", i, info.name, info.non_null, info.dtype)?;
    }
    writer.flush()
}

pub fn write_counts<W: Write>(out: W, counts: &[(String, usize)]) -> io::Result<()> {
    let mut writer = TabWriter::new(out);
    for (label, n) in counts {
        writeln!(writer, "{label}\t{n}")?;
    }
    writer.flush()
}

fn size_cost_histograms(df: &DataFrame, path: &Path, figure: &Figure) -> Result<()> {
    let nameplate = numeric_values(df, NAMEPLATE)?;
    let cost = numeric_values(df, TOTAL_COST)?;
    histogram_pair(
        &Panel::new("Nameplate", &nameplate, BinRule::default()),
        &Panel::new("Cost", &cost, BinRule::default()),
        path,
        figure,
    )
    .with_context(|| format!("rendering {}", path.display()))
}

/// Counts reordered by their label, numerically when every label parses as
/// a number (years), otherwise alphabetically.
fn ordered_by_value(mut counts: Vec<(String, usize)>) -> Vec<(String, usize)> {
    let numeric = counts.iter().all(|(label, _)| label.parse::<f64>().is_ok());
    if numeric {
        counts.sort_by(|a, b| {
            let (x, y) = (a.0.parse::<f64>(), b.0.parse::<f64>());
            match (x, y) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            }
        });
    } else {
        counts.sort_by(|a, b| a.0.cmp(&b.0));
    }
    counts
}

/// "99th" for 0.99, "99.5th" for 0.995.
fn percentile_label(q: f64) -> String {
    let pct = (q * 1000.0).round() / 10.0;
    if pct.fract() != 0.0 {
        return format!("{pct}th");
    }
    let n = pct as u64;
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn median_cost_per_watt(kw: &[f64], cost: &[f64]) -> Option<f64> {
    let ratios: Vec<f64> = kw
        .iter()
        .zip(cost)
        .filter_map(|(&k, &c)| Dollars(c).per_watt(Kilowatts(k)))
        .collect();
    quantile(&ratios, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn percentile_labels() {
        assert_eq!(percentile_label(0.99), "99th");
        assert_eq!(percentile_label(0.995), "99.5th");
        assert_eq!(percentile_label(0.91), "91st");
        assert_eq!(percentile_label(0.92), "92nd");
        assert_eq!(percentile_label(0.13), "13th");
        assert_eq!(percentile_label(1.0), "100th");
    }

    #[test]
    fn years_sort_numerically() {
        let counts = vec![
            ("2012".to_string(), 4),
            ("2009".to_string(), 9),
            ("2010".to_string(), 1),
        ];
        let labels: Vec<String> = ordered_by_value(counts).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["2009", "2010", "2012"]);

        let flags = vec![("true".to_string(), 8), ("false".to_string(), 3)];
        assert_eq!(ordered_by_value(flags)[0].0, "false");
    }

    #[test]
    fn cost_per_watt_skips_zero_capacity() {
        let kw = [5.0, 0.0, 4.0, 2.0];
        let cost = [30000.0, 1000.0, 20000.0, 14000.0];
        // ratios 6.0, 5.0, 7.0
        assert_eq!(median_cost_per_watt(&kw, &cost), Some(6.0));
        assert_eq!(median_cost_per_watt(&[], &[]), None);
    }

    #[test]
    fn inspect_prints_schema_and_counts() {
        let df = df![
            "app_status" => &["Completed", "Completed", "Cancelled"],
            "sector" => &["Residential", "Commercial", "Residential"],
            "state" => &["CA", "CA", "CA"],
            "inst_status" => &["Installed", "Installed", "Pending"],
            "type" => &["PV", "PV", "PV"],
            "nameplate" => &[Some(4.0f64), None, Some(3.5)],
        ]
        .unwrap();
        let mut buf = Vec::new();
        let counts = inspect_table(&df, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("3 entries, 6 columns"));
        assert!(text.contains("nameplate"));
        assert!(text.lines().any(|l| l.starts_with("Residential") && l.ends_with('2')));
        assert_eq!(counts.len(), 5);
        assert_eq!(counts[0].0, "app_status");
        assert_eq!(counts[0].1[0], ("Completed".to_string(), 2));
    }
}
