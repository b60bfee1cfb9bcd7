use assert_cmd::Command;
use csi_cli::manifest::read_manifest;
use csi_cli::{run_pipeline, PipelineConfig};
use csi_stats::quantile;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const HEADER: &str =
    "app_status,sector,state,inst_status,type,third_party,year,nameplate,total_cost";

/// Nameplate and cost of fixture row `i`, as written to the CSV.
fn fixture_values(i: usize) -> (f64, f64) {
    let kw = 2.0 + (i % 17) as f64 * 0.45;
    let cost = kw * 6200.0 + (i % 7) as f64 * 850.0;
    let parse = |v: f64| format!("{v:.2}").parse::<f64>().unwrap();
    (parse(kw), parse(cost))
}

/// A small application table: mostly completed residential systems with a
/// few commercial, cancelled, pending and incomplete rows mixed in.
fn write_fixture(dir: &Path) -> PathBuf {
    let mut rows = vec![HEADER.to_string()];
    for i in 0..120usize {
        let third_party = if i % 3 == 0 { "true" } else { "false" };
        let year = 2007 + (i % 12);
        let (kw, cost) = fixture_values(i);
        rows.push(format!(
            "Completed,Residential,CA,Installed,PV,{third_party},{year},{kw},{cost}"
        ));
    }
    rows.push("Completed,Commercial,CA,Installed,PV,false,2011,250.0,900000".into());
    rows.push("Cancelled,Residential,CA,Installed,PV,false,2012,4.0,21000".into());
    rows.push("Completed,Residential,CA,Pending,PV,true,2013,5.0,26000".into());
    rows.push("Completed,Residential,CA,Installed,PV,true,2014,,30000".into());
    let path = dir.join("ca_csi_2020.csv");
    fs::write(&path, rows.join("\n")).unwrap();
    path
}

#[test]
fn inspect_prints_schema_and_counts() {
    let tmp = tempdir().unwrap();
    let input = write_fixture(tmp.path());
    let mut cmd = Command::cargo_bin("csi-cli").unwrap();
    cmd.args(["inspect", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("124 entries, 9 columns"))
        .stdout(predicate::str::contains("Residential"))
        .stdout(predicate::str::contains("inst_status"));
}

#[test]
fn inspect_rejects_unknown_extension() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("records.txt");
    fs::write(&input, "a,b\n1,2\n").unwrap();
    let mut cmd = Command::cargo_bin("csi-cli").unwrap();
    cmd.args(["inspect", input.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("unsupported file extension"));
}

#[test]
fn run_fails_for_missing_input() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("absent.zip");
    let mut cmd = Command::cargo_bin("csi-cli").unwrap();
    cmd.args([
        "run",
        input.to_str().unwrap(),
        "--out-dir",
        tmp.path().to_str().unwrap(),
    ])
    .assert()
    .failure()
    .stdout(predicate::str::contains("opening"));
}

#[test]
fn run_reports_missing_column() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("partial.csv");
    fs::write(
        &input,
        "app_status,sector,state,inst_status,type,third_party,year,nameplate\n\
         Completed,Residential,CA,Installed,PV,false,2010,4.5\n",
    )
    .unwrap();
    let mut cmd = Command::cargo_bin("csi-cli").unwrap();
    cmd.args([
        "run",
        input.to_str().unwrap(),
        "--out-dir",
        tmp.path().to_str().unwrap(),
    ])
    .assert()
    .failure()
    .stdout(predicate::str::contains("Missing column: total_cost"));
}

#[test]
fn run_rejects_invalid_config() {
    let tmp = tempdir().unwrap();
    let input = write_fixture(tmp.path());
    let config = tmp.path().join("csi.toml");
    fs::write(&config, "[trim]\nquantile = 1.5\n").unwrap();
    let mut cmd = Command::cargo_bin("csi-cli").unwrap();
    cmd.args([
        "--config",
        config.to_str().unwrap(),
        "run",
        input.to_str().unwrap(),
        "--out-dir",
        tmp.path().to_str().unwrap(),
    ])
    .assert()
    .failure()
    .stdout(predicate::str::contains("trim.quantile"));
    assert!(!tmp.path().join("count_sector.png").exists());
}

#[test]
fn completions_written_to_file() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("completions").join("csi-cli.bash");
    let mut cmd = Command::cargo_bin("csi-cli").unwrap();
    cmd.args(["completions", "bash", "--out", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote Bash completion"));
    let script = fs::read_to_string(&out).unwrap();
    assert!(script.contains("csi-cli"));
}

#[test]
fn run_writes_every_chart_and_manifest() {
    let tmp = tempdir().unwrap();
    let input = write_fixture(tmp.path());
    let out_dir = tmp.path().join("figures");
    let mut cmd = Command::cargo_bin("csi-cli").unwrap();
    cmd.args([
        "run",
        input.to_str().unwrap(),
        "--out-dir",
        out_dir.to_str().unwrap(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Number of original records: 124"))
    .stdout(predicate::str::contains("Number of records after filtering: 121"))
    .stdout(predicate::str::contains(
        "Number of dropped records with missing data for nameplate capacity and total cost: 1",
    ))
    .stdout(predicate::str::contains("99th percentile in size"));

    let expected = [
        "count_app_status.png",
        "count_sector.png",
        "count_state.png",
        "count_inst_status.png",
        "count_type.png",
        "res_third_party.png",
        "res_year.png",
        "nameplate_cost_raw.png",
        "nameplate_cost.png",
        "res_nameplate.png",
        "res_total_cost.png",
        "res_boxen_all.png",
        "res_violin.png",
        "res_kde.png",
        "res_boxen_year.png",
        "res_hexbin.png",
    ];
    for name in expected {
        assert!(out_dir.join(name).exists(), "{name} was not written");
    }

    let manifest = fs::read_dir(&out_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("run-") && n.ends_with(".json"))
        })
        .expect("run manifest");
    let entry = read_manifest(&manifest).unwrap();
    assert_eq!(entry.command, "run");
    assert_eq!(entry.outputs.len(), expected.len());
}

#[test]
fn pipeline_report_counts_only_shrink() {
    let tmp = tempdir().unwrap();
    let input = write_fixture(tmp.path());
    let mut config = PipelineConfig::default();
    config.render.dpi = 72;
    let report = run_pipeline(&input, &tmp.path().join("figures"), &config).unwrap();

    let mut rows = report.filter.original;
    for step in &report.filter.steps {
        assert!(step.rows <= rows, "{} grew the table", step.column);
        rows = step.rows;
    }
    assert_eq!(report.filter.remaining(), 121);
    assert_eq!(report.dropped_missing, 1);

    let after_drop = report.filter.remaining() - report.dropped_missing;
    assert!(report.trimmed_rows <= after_drop);
    assert!(report.through_year_rows <= report.trimmed_rows);

    let (kw, cost): (Vec<f64>, Vec<f64>) = (0..120).map(fixture_values).unzip();
    let kw_q99 = quantile(&kw, 0.99).unwrap();
    let cost_q99 = quantile(&cost, 0.99).unwrap();
    assert!((report.thresholds.nameplate.value() - kw_q99).abs() < 1e-9);
    assert!((report.thresholds.total_cost.value() - cost_q99).abs() < 1e-6);

    assert_eq!(report.charts.len(), 16);
    assert!(report.charts.iter().all(|p| p.exists()));
    assert!(report.median_cost_per_watt.is_some());
}
