use std::path::Path;

use csi_stats::{DensityCurve, KdeOptions, Summary};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use tracing::debug;

use crate::category::{category_axis, category_label, category_ticks};
use crate::error::{area_err, config_err, draw_err, prepare_output, PlotError, Result};
use crate::histogram::compact;
use crate::theme::{deep, Figure};
use crate::Groups;

/// Widest half-violin as a fraction of the category slot.
const HALF_WIDTH: f64 = 0.4;

/// Density tails extend this many bandwidths past the data.
const VIOLIN_CUT: f64 = 2.0;

/// Horizontal split violin for a single category row.
///
/// The first hue group is drawn above the centre line and the second below
/// it; both halves share one density scale so their widths compare
/// directly. An inner box shows the quartiles of the pooled values.
pub fn split_violin(
    title: &str,
    category: &str,
    value_desc: &str,
    hue: &str,
    groups: &Groups,
    output_path: &Path,
    figure: &Figure,
) -> Result<()> {
    if groups.len() > 2 {
        return Err(PlotError::InvalidData(format!(
            "a split violin takes at most two {hue} groups, got {}",
            groups.len()
        )));
    }
    let options = KdeOptions {
        cut: VIOLIN_CUT,
        ..KdeOptions::default()
    };
    let halves: Vec<(&str, DensityCurve)> = groups
        .iter()
        .filter_map(|(label, values)| {
            DensityCurve::from_values(values, &options).map(|c| (label.as_str(), c))
        })
        .collect();
    let pooled: Vec<f64> = groups.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    let summary = Summary::from_values(&pooled);
    let Some(summary) = summary.filter(|_| !halves.is_empty()) else {
        return Err(PlotError::InvalidData(format!(
            "not enough {value_desc} values for a violin"
        )));
    };
    prepare_output(output_path)?;

    let (lo, hi) = halves
        .iter()
        .filter_map(|(_, c)| c.x_range())
        .fold((summary.min, summary.max), |(lo, hi), (a, b)| {
            (lo.min(a), hi.max(b))
        });
    let peak = halves
        .iter()
        .map(|(_, c)| c.max_density())
        .fold(0.0, f64::max);
    let scale = if peak > 0.0 { HALF_WIDTH / peak } else { 0.0 };
    let labels = vec![category.to_string()];

    let root = BitMapBackend::new(output_path, figure.pixels()).into_drawing_area();
    root.fill(&WHITE).map_err(area_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", figure.font(12.0)))
        .margin(figure.points(8.0))
        .x_label_area_size(figure.points(28.0))
        .y_label_area_size(figure.label_width(&labels, 10.0) + figure.points(16.0))
        .build_cartesian_2d(lo..hi, category_axis(1))
        .map_err(config_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(category_ticks(1))
        .x_desc(value_desc)
        .y_label_formatter(&|v| category_label(&labels, *v))
        .x_label_formatter(&|v| compact(*v))
        .label_style(("sans-serif", figure.font(10.0)))
        .axis_desc_style(("sans-serif", figure.font(11.0)))
        .draw()
        .map_err(draw_err)?;

    let swatch = figure.points(5.0) as i32;
    for (i, (label, curve)) in halves.iter().enumerate() {
        let color = deep(i);
        let side = if i == 0 { 1.0 } else { -1.0 };
        chart
            .draw_series(std::iter::once(Polygon::new(
                half_outline(curve, side * scale),
                color.mix(0.8).filled(),
            )))
            .map_err(draw_err)?
            .label(format!("{hue} = {label}"))
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - swatch), (x + 2 * swatch, y + swatch)], color.filled())
            });
        chart
            .draw_series(std::iter::once(PathElement::new(
                half_outline(curve, side * scale),
                BLACK.mix(0.5).stroke_width(1),
            )))
            .map_err(draw_err)?;
    }

    draw_inner_box(&mut chart, &summary, figure)?;

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
        "Wrote split violin of {} ({} halves) to {}",
        value_desc,
        halves.len(),
        output_path.display()
    );
    Ok(())
}

/// Closed outline of one half: the density edge, then back along the
/// centre line.
fn half_outline(curve: &DensityCurve, scale: f64) -> Vec<(f64, f64)> {
    let mut points: Vec<(f64, f64)> = curve.points().map(|(x, d)| (x, d * scale)).collect();
    if let Some((last, first)) = curve.x.last().zip(curve.x.first()) {
        points.push((*last, 0.0));
        points.push((*first, 0.0));
    }
    points
}

fn draw_inner_box<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    summary: &Summary,
    figure: &Figure,
) -> Result<()> {
    let reach = 1.5 * summary.iqr();
    let low = (summary.q1 - reach).max(summary.min);
    let high = (summary.q3 + reach).min(summary.max);
    let dark = RGBColor(60, 60, 60);
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(low, 0.0), (high, 0.0)],
            dark.stroke_width(figure.points(1.0)),
        )))
        .map_err(draw_err)?;
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(summary.q1, 0.0), (summary.q3, 0.0)],
            dark.stroke_width(figure.points(4.0)),
        )))
        .map_err(draw_err)?;
    chart
        .draw_series(std::iter::once(Circle::new(
            (summary.median, 0.0),
            figure.points(2.0),
            WHITE.filled(),
        )))
        .map_err(draw_err)?;
    Ok(())
}
