use std::path::Path;

use csi_stats::{BinRule, DensityCurve, Histogram, KdeOptions};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::error::{area_err, config_err, draw_err, prepare_output, PlotError, Result};
use crate::theme::{deep, Figure};
use crate::Groups;

/// One titled histogram panel.
#[derive(Debug, Clone)]
pub struct Panel<'a> {
    pub title: &'a str,
    pub histogram: Histogram,
}

impl<'a> Panel<'a> {
    pub fn new(title: &'a str, values: &[f64], rule: BinRule) -> Self {
        Self {
            title,
            histogram: Histogram::from_values(values, rule),
        }
    }
}

/// Two histograms side by side, e.g. capacity next to cost.
pub fn histogram_pair(
    left: &Panel<'_>,
    right: &Panel<'_>,
    output_path: &Path,
    figure: &Figure,
) -> Result<()> {
    for panel in [left, right] {
        if panel.histogram.is_empty() {
            return Err(PlotError::InvalidData(format!(
                "no values for the {} panel",
                panel.title
            )));
        }
    }
    prepare_output(output_path)?;

    let root = BitMapBackend::new(output_path, figure.pixels()).into_drawing_area();
    root.fill(&WHITE).map_err(area_err)?;
    let panels = root.split_evenly((1, 2));
    draw_panel(&panels[0], left, figure)?;
    draw_panel(&panels[1], right, figure)?;

    root.present().map_err(draw_err)?;
    debug!(
        "Wrote histogram pair ({} + {} values) to {}",
        left.histogram.total(),
        right.histogram.total(),
        output_path.display()
    );
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel<'_>,
    figure: &Figure,
) -> Result<()> {
    let hist = &panel.histogram;
    let (lo, hi) = hist.range().unwrap_or((0.0, 1.0));
    let top = (hist.max_count() as f64 * 1.05).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, ("sans-serif", figure.font(12.0)))
        .margin(figure.points(6.0))
        .x_label_area_size(figure.points(20.0))
        .y_label_area_size(figure.points(36.0))
        .build_cartesian_2d(lo..hi, 0f64..top)
        .map_err(config_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .y_desc("Frequency")
        .x_labels(4)
        .x_label_formatter(&|v| compact(*v))
        .y_label_formatter(&|v| compact(*v))
        .label_style(("sans-serif", figure.font(8.0)))
        .axis_desc_style(("sans-serif", figure.font(10.0)))
        .draw()
        .map_err(draw_err)?;

    let fill = deep(0);
    chart
        .draw_series(hist.bars().map(|(l, r, c)| {
            Rectangle::new([(l, 0.0), (r, c as f64)], fill.filled())
        }))
        .map_err(draw_err)?;
    chart
        .draw_series(hist.bars().map(|(l, r, c)| {
            Rectangle::new([(l, 0.0), (r, c as f64)], BLACK.mix(0.6).stroke_width(1))
        }))
        .map_err(draw_err)?;
    Ok(())
}

/// Layered histograms of one variable split by a hue column, each with a
/// density curve scaled to its counts.
///
/// Bins are shared across groups so the bars line up.
pub fn hue_histogram(
    variable: &str,
    hue: &str,
    groups: &Groups,
    output_path: &Path,
    figure: &Figure,
) -> Result<()> {
    let all: Vec<f64> = groups.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    let edges = BinRule::Auto.edges(&all);
    if edges.is_empty() {
        return Err(PlotError::InvalidData(format!("no values for {variable}")));
    }
    prepare_output(output_path)?;

    let layers: Vec<(&str, Histogram, Option<DensityCurve>)> = groups
        .iter()
        .map(|(label, values)| {
            let hist = Histogram::with_edges(values, edges.clone());
            let scale = values.len() as f64 * hist.bin_width();
            let curve =
                DensityCurve::from_values(values, &KdeOptions::clipped()).map(|c| c.scaled(scale));
            (label.as_str(), hist, curve)
        })
        .collect();

    let top = layers
        .iter()
        .map(|(_, h, c)| {
            let peak = c.as_ref().map_or(0.0, DensityCurve::max_density);
            (h.max_count() as f64).max(peak)
        })
        .fold(1.0, f64::max)
        * 1.05;
    let (lo, hi) = (edges[0], edges[edges.len() - 1]);

    let root = BitMapBackend::new(output_path, figure.pixels()).into_drawing_area();
    root.fill(&WHITE).map_err(area_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(figure.points(8.0))
        .x_label_area_size(figure.points(28.0))
        .y_label_area_size(figure.points(40.0))
        .build_cartesian_2d(lo..hi, 0f64..top)
        .map_err(config_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(variable)
        .y_desc("Count")
        .x_label_formatter(&|v| compact(*v))
        .y_label_formatter(&|v| compact(*v))
        .label_style(("sans-serif", figure.font(10.0)))
        .axis_desc_style(("sans-serif", figure.font(11.0)))
        .draw()
        .map_err(draw_err)?;

    let swatch = figure.points(5.0) as i32;
    for (i, (label, hist, _)) in layers.iter().enumerate() {
        let color = deep(i);
        chart
            .draw_series(hist.bars().map(|(l, r, c)| {
                Rectangle::new([(l, 0.0), (r, c as f64)], color.mix(0.5).filled())
            }))
            .map_err(draw_err)?
            .label(*label)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - swatch), (x + 2 * swatch, y + swatch)], color.mix(0.5).filled())
            });
    }
    for (i, (_, _, curve)) in layers.iter().enumerate() {
        if let Some(curve) = curve {
            let style = deep(i).stroke_width(figure.points(1.5));
            chart
                .draw_series(LineSeries::new(curve.points(), style))
                .map_err(draw_err)?;
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .label_font(("sans-serif", figure.font(9.0)))
        .draw()
        .map_err(draw_err)?;

    // legend title sits just above the entries
    root.draw(&Text::new(
        hue.to_string(),
        (
            figure.pixels().0 as i32 - figure.points(110.0) as i32,
            figure.points(8.0) as i32,
        ),
        ("sans-serif", figure.font(9.0)),
    ))
    .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    debug!(
        "Wrote {} hue layers of {} to {}",
        layers.len(),
        variable,
        output_path.display()
    );
    Ok(())
}

/// Tick label without trailing noise: 12000 -> "12k", 2.5 -> "2.5".
pub(crate) fn compact(v: f64) -> String {
    let a = v.abs();
    if a >= 1_000_000.0 {
        format!("{}M", trim(v / 1_000_000.0))
    } else if a >= 10_000.0 {
        format!("{}k", trim(v / 1000.0))
    } else {
        trim(v)
    }
}

fn trim(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn compact_labels() {
        assert_eq!(compact(0.0), "0");
        assert_eq!(compact(2.5), "2.5");
        assert_eq!(compact(7.126), "7.13");
        assert_eq!(compact(9500.0), "9500");
        assert_eq!(compact(12000.0), "12k");
        assert_eq!(compact(1_250_000.0), "1.25M");
        assert_eq!(compact(-0.001), "0");
    }

    #[test]
    fn pair_rejects_empty_panel() {
        let dir = tempdir().unwrap();
        let left = Panel::new("Nameplate", &[1.0, 2.0], BinRule::default());
        let right = Panel::new("Cost", &[], BinRule::default());
        let result = histogram_pair(&left, &right, &dir.path().join("p.png"), &Figure::standard(50));
        assert!(matches!(result, Err(PlotError::InvalidData(msg)) if msg.contains("Cost")));
    }

    #[test]
    fn hue_histogram_rejects_empty_groups() {
        let dir = tempdir().unwrap();
        let groups: Vec<(String, Vec<f64>)> = vec![("true".into(), vec![])];
        let result = hue_histogram(
            "nameplate",
            "third_party",
            &groups,
            &dir.path().join("h.png"),
            &Figure::standard(50),
        );
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
    }

    #[test]
    fn renders_pair_and_hue_histogram() {
        let dir = tempdir().unwrap();
        let a: Vec<f64> = (0..200).map(|i| (i % 17) as f64 * 0.5 + 2.0).collect();
        let b: Vec<f64> = (0..200).map(|i| (i % 13) as f64 * 900.0 + 8000.0).collect();
        let pair = dir.path().join("nameplate_cost.png");
        histogram_pair(
            &Panel::new("Nameplate", &a, BinRule::default()),
            &Panel::new("Cost", &b, BinRule::default()),
            &pair,
            &Figure::standard(60),
        )
        .unwrap();
        assert!(pair.exists());

        let groups = vec![("false".to_string(), a.clone()), ("true".to_string(), b[..50].to_vec())];
        let hue = dir.path().join("res_nameplate.png");
        hue_histogram("nameplate", "third_party", &groups, &hue, &Figure::standard(60)).unwrap();
        assert!(hue.exists());
    }
}
