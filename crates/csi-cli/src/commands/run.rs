use anyhow::Result;
use csi_cli::{manifest::record_manifest, run_pipeline, PipelineConfig, RunArgs};
use tracing::info;

pub fn handle(args: &RunArgs, config: &PipelineConfig) -> Result<()> {
    info!(
        "Running CSI analysis on {} into {}",
        args.input.display(),
        args.out_dir.display()
    );
    let report = run_pipeline(&args.input, &args.out_dir, config)?;
    if !args.no_manifest {
        let params = [
            ("sector", config.filter.sector.clone()),
            ("app_status", config.filter.app_status.clone()),
            ("inst_status", config.filter.inst_status.clone()),
            ("quantile", config.trim.quantile.to_string()),
            ("last_year", config.trim.last_year.to_string()),
            ("dpi", config.render.dpi.to_string()),
            ("records_after_filter", report.filter.remaining().to_string()),
            ("records_after_trim", report.trimmed_rows.to_string()),
        ];
        let path = record_manifest(&args.out_dir, "run", &args.input, &report.charts, &params)?;
        println!("Recorded run manifest {}", path.display());
    }
    Ok(())
}
