use std::path::Path;

use csi_stats::{DensityCurve, KdeOptions};
use plotters::prelude::*;
use tracing::{debug, warn};

use crate::error::{area_err, config_err, draw_err, prepare_output, PlotError, Result};
use crate::histogram::compact;
use crate::theme::{crest, Figure};
use crate::Groups;

/// Filled density curves, one per hue group.
///
/// Each curve is weighted by its group's share of all values so the areas
/// add up to one across the figure and a small group stays visibly small.
pub fn kde_overlay(
    title: &str,
    value_desc: &str,
    hue: &str,
    groups: &Groups,
    output_path: &Path,
    figure: &Figure,
) -> Result<()> {
    let total: usize = groups.iter().map(|(_, v)| v.len()).sum();
    let options = KdeOptions::default();
    let mut curves: Vec<(&str, DensityCurve)> = Vec::with_capacity(groups.len());
    for (label, values) in groups {
        match DensityCurve::from_values(values, &options) {
            Some(curve) => {
                let share = values.len() as f64 / total as f64;
                curves.push((label.as_str(), curve.scaled(share)));
            }
            None => warn!("Skipping {hue}={label}: too few distinct {value_desc} values for a density"),
        }
    }
    if curves.is_empty() {
        return Err(PlotError::InvalidData(format!(
            "no {hue} group has enough {value_desc} values for a density"
        )));
    }
    prepare_output(output_path)?;

    let (lo, hi) = curves
        .iter()
        .filter_map(|(_, c)| c.x_range())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| {
            (lo.min(a), hi.max(b))
        });
    let top = curves
        .iter()
        .map(|(_, c)| c.max_density())
        .fold(0.0, f64::max)
        * 1.05;

    let root = BitMapBackend::new(output_path, figure.pixels()).into_drawing_area();
    root.fill(&WHITE).map_err(area_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", figure.font(12.0)))
        .margin(figure.points(8.0))
        .x_label_area_size(figure.points(28.0))
        .y_label_area_size(figure.points(44.0))
        .build_cartesian_2d(lo..hi, 0f64..top)
        .map_err(config_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(value_desc)
        .x_label_formatter(&|v| compact(*v))
        .y_label_formatter(&|v| format!("{v:.3}"))
        .label_style(("sans-serif", figure.font(10.0)))
        .axis_desc_style(("sans-serif", figure.font(11.0)))
        .draw()
        .map_err(draw_err)?;

    let palette = crest(curves.len());
    let swatch = figure.points(5.0) as i32;
    for ((label, curve), color) in curves.iter().zip(palette) {
        chart
            .draw_series(
                AreaSeries::new(curve.points(), 0.0, color.mix(0.5))
                    .border_style(color.stroke_width(figure.points(1.0))),
            )
            .map_err(draw_err)?
            .label(format!("{hue} = {label}"))
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - swatch), (x + 2 * swatch, y + swatch)], color.mix(0.5).filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .label_font(("sans-serif", figure.font(9.0)))
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    debug!(
        "Wrote {} density curves of {} to {}",
        curves.len(),
        value_desc,
        output_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rejects_degenerate_groups() {
        let dir = tempdir().unwrap();
        let groups = vec![
            ("false".to_string(), vec![4.0, 4.0, 4.0]),
            ("true".to_string(), vec![1.0]),
        ];
        let result = kde_overlay(
            "Nameplate Capacity",
            "kW",
            "third_party",
            &groups,
            &dir.path().join("k.png"),
            &Figure::standard(50),
        );
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
    }

    #[test]
    fn renders_weighted_curves() {
        let dir = tempdir().unwrap();
        let groups = vec![
            ("false".to_string(), (0..400).map(|i| (i % 23) as f64 * 0.3 + 2.0).collect()),
            ("true".to_string(), (0..100).map(|i| (i % 19) as f64 * 0.4 + 3.0).collect()),
        ];
        let path = dir.path().join("res_kde.png");
        kde_overlay(
            "Nameplate Capacity",
            "kW",
            "third_party",
            &groups,
            &path,
            &Figure::standard(60),
        )
        .unwrap();
        assert!(path.exists());
    }
}
