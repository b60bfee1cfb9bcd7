use std::path::Path;

use plotters::prelude::*;
use tracing::debug;

use crate::category::{category_axis, category_label, category_ticks};
use crate::error::{area_err, config_err, draw_err, prepare_output, PlotError, Result};
use crate::theme::{deep, Figure};

/// Horizontal bar chart of category frequencies, one bar per label.
///
/// Categories are drawn top to bottom in the order given, so pass counts
/// already sorted the way they should read.
pub fn count_chart(
    counts: &[(String, usize)],
    variable: &str,
    output_path: &Path,
    figure: &Figure,
) -> Result<()> {
    if counts.is_empty() {
        return Err(PlotError::InvalidData(format!(
            "no values to count for {variable}"
        )));
    }
    prepare_output(output_path)?;

    let n = counts.len();
    // slot 0 is the bottom of the chart
    let labels: Vec<String> = counts.iter().rev().map(|(label, _)| label.clone()).collect();
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64;

    let root = BitMapBackend::new(output_path, figure.pixels()).into_drawing_area();
    root.fill(&WHITE).map_err(area_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(figure.points(8.0))
        .x_label_area_size(figure.points(30.0))
        .y_label_area_size(figure.label_width(&labels, 10.0) + figure.points(16.0))
        .build_cartesian_2d(0f64..(max * 1.05).max(1.0), category_axis(n))
        .map_err(config_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(category_ticks(n))
        .x_desc("count")
        .y_desc(variable)
        .y_label_formatter(&|v| category_label(&labels, *v))
        .x_label_formatter(&|v| format!("{v:.0}"))
        .label_style(("sans-serif", figure.font(10.0)))
        .axis_desc_style(("sans-serif", figure.font(11.0)))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(counts.iter().rev().enumerate().map(|(slot, (_, count))| {
            let y = slot as f64;
            Rectangle::new(
                [(0.0, y - 0.4), (*count as f64, y + 0.4)],
                deep(n - 1 - slot).filled(),
            )
        }))
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    debug!("Wrote {} category counts to {}", n, output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rejects_empty_counts() {
        let dir = tempdir().unwrap();
        let result = count_chart(&[], "sector", &dir.path().join("x.png"), &Figure::square(50));
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
    }

    #[test]
    fn renders_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("count_sector.png");
        let counts = vec![
            ("Residential".to_string(), 120),
            ("Commercial".to_string(), 30),
            ("Government".to_string(), 4),
        ];
        count_chart(&counts, "sector", &path, &Figure::square(60)).unwrap();
        assert!(path.exists());
    }
}
