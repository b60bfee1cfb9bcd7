use std::path::Path;

use csi_stats::{hexbin, joint_gridsize, BinRule, HexBinning, Histogram};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use tracing::debug;

use crate::error::{area_err, config_err, draw_err, prepare_output, PlotError, Result};
use crate::histogram::compact;
use crate::theme::{deep, heat, Figure};

/// Share of the figure given to the main panel; marginals get the rest.
const MAIN_SHARE: f64 = 0.8;

/// Joint plot: hexagonal density of `(x, y)` with marginal histograms on
/// the top and right edges.
pub fn hexbin_joint(
    x: &[f64],
    y: &[f64],
    x_desc: &str,
    y_desc: &str,
    title: &str,
    output_path: &Path,
    figure: &Figure,
) -> Result<()> {
    if x.len() != y.len() {
        return Err(PlotError::InvalidData(format!(
            "{x_desc} has {} values but {y_desc} has {}",
            x.len(),
            y.len()
        )));
    }
    let gridsize = joint_gridsize(x, y);
    let binning = hexbin(x, y, gridsize)
        .ok_or_else(|| PlotError::InvalidData(format!("no finite ({x_desc}, {y_desc}) pairs")))?;
    prepare_output(output_path)?;

    let x_range = padded(x);
    let y_range = padded(y);
    let x_hist = Histogram::from_values(x, BinRule::Auto);
    let y_hist = Histogram::from_values(y, BinRule::Auto);

    let (width, height) = figure.pixels();
    let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(area_err)?;
    let body = root
        .titled(title, ("sans-serif", figure.font(13.0)))
        .map_err(area_err)?;
    let (body_w, body_h) = body.dim_in_pixel();
    let (upper, lower) = body.split_vertically((body_h as f64 * (1.0 - MAIN_SHARE)) as u32);
    let (top, _) = upper.split_horizontally((body_w as f64 * MAIN_SHARE) as u32);
    let (main, right) = lower.split_horizontally((body_w as f64 * MAIN_SHARE) as u32);

    let margin = figure.points(4.0);
    let x_area = figure.points(28.0);
    let y_area = figure.points(44.0);

    let mut chart = ChartBuilder::on(&main)
        .margin(margin)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
        .map_err(config_err)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(5)
        .x_label_formatter(&|v| compact(*v))
        .y_label_formatter(&|v| compact(*v))
        .label_style(("sans-serif", figure.font(9.0)))
        .axis_desc_style(("sans-serif", figure.font(10.0)))
        .draw()
        .map_err(draw_err)?;
    draw_cells(&mut chart, &binning)?;

    let fill = deep(0);
    let x_top = (x_hist.max_count() as f64 * 1.05).max(1.0);
    let mut top_chart = ChartBuilder::on(&top)
        .margin(margin)
        .y_label_area_size(y_area)
        .build_cartesian_2d(x_range.0..x_range.1, 0f64..x_top)
        .map_err(config_err)?;
    top_chart
        .draw_series(x_hist.bars().map(|(l, r, c)| {
            Rectangle::new([(l, 0.0), (r, c as f64)], fill.mix(0.8).filled())
        }))
        .map_err(draw_err)?;

    let y_top = (y_hist.max_count() as f64 * 1.05).max(1.0);
    let mut right_chart = ChartBuilder::on(&right)
        .margin(margin)
        .x_label_area_size(x_area)
        .build_cartesian_2d(0f64..y_top, y_range.0..y_range.1)
        .map_err(config_err)?;
    right_chart
        .draw_series(y_hist.bars().map(|(l, r, c)| {
            Rectangle::new([(0.0, l), (c as f64, r)], fill.mix(0.8).filled())
        }))
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    debug!(
        "Wrote {} hexagons holding {} points ({}x{} grid) to {}",
        binning.cells.len(),
        binning.total(),
        binning.grid.nx,
        binning.grid.ny,
        output_path.display()
    );
    Ok(())
}

fn draw_cells<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    binning: &HexBinning,
) -> Result<()> {
    let max = binning.max_count().max(1) as f64;
    chart
        .draw_series(binning.cells.iter().map(|cell| {
            let shade = heat(cell.count as f64 / max);
            Polygon::new(binning.grid.hexagon(cell.center).to_vec(), shade.filled())
        }))
        .map_err(draw_err)?;
    Ok(())
}

fn padded(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.02 } else { 0.5 };
    (lo - pad, hi + pad)
}
