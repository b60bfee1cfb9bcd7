use std::path::Path;

use csi_stats::{letter_values, LetterValues};
use plotters::coord::CoordTranslate;
use plotters::prelude::*;
use tracing::debug;

use crate::category::{category_axis, category_label, category_ticks};
use crate::error::{area_err, config_err, draw_err, prepare_output, PlotError, Result};
use crate::histogram::compact;
use crate::theme::{deep, lighten, Figure};
use crate::Groups;

/// Which axis carries the categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Categories along x, values up the y axis.
    #[default]
    Vertical,
    /// Categories down the y axis, first category at the top.
    Horizontal,
}

/// Widest box as a fraction of one category slot.
const BOX_WIDTH: f64 = 0.8;

/// Letter-value plot with one stack of nested boxes per group.
pub fn boxen_chart(
    groups: &Groups,
    orientation: Orientation,
    title: &str,
    category_desc: &str,
    value_desc: &str,
    output_path: &Path,
    figure: &Figure,
) -> Result<()> {
    let summaries: Vec<(&str, LetterValues)> = groups
        .iter()
        .filter_map(|(label, values)| letter_values(values).map(|lv| (label.as_str(), lv)))
        .collect();
    if summaries.is_empty() {
        return Err(PlotError::InvalidData(format!(
            "no {value_desc} values in any {category_desc} group"
        )));
    }
    prepare_output(output_path)?;

    let n = summaries.len();
    let (lo, hi) = value_span(&summaries);
    let (slots, labels): (Vec<f64>, Vec<String>) = match orientation {
        Orientation::Vertical => (
            (0..n).map(|i| i as f64).collect(),
            summaries.iter().map(|(l, _)| l.to_string()).collect(),
        ),
        Orientation::Horizontal => (
            (0..n).map(|i| (n - 1 - i) as f64).collect(),
            summaries.iter().rev().map(|(l, _)| l.to_string()).collect(),
        ),
    };

    let root = BitMapBackend::new(output_path, figure.pixels()).into_drawing_area();
    root.fill(&WHITE).map_err(area_err)?;
    let mut builder = ChartBuilder::on(&root);
    builder
        .caption(title, ("sans-serif", figure.font(12.0)))
        .margin(figure.points(8.0))
        .x_label_area_size(figure.points(28.0));

    match orientation {
        Orientation::Vertical => {
            let mut chart = builder
                .y_label_area_size(figure.points(40.0))
                .build_cartesian_2d(category_axis(n), lo..hi)
                .map_err(config_err)?;
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(category_ticks(n))
                .x_desc(category_desc)
                .y_desc(value_desc)
                .x_label_formatter(&|v| category_label(&labels, *v))
                .y_label_formatter(&|v| compact(*v))
                .label_style(("sans-serif", figure.font(10.0)))
                .axis_desc_style(("sans-serif", figure.font(11.0)))
                .draw()
                .map_err(draw_err)?;
            draw_boxes(&mut chart, &summaries, &slots, figure, |c, v| (c, v))?;
        }
        Orientation::Horizontal => {
            let mut chart = builder
                .y_label_area_size(figure.label_width(&labels, 10.0) + figure.points(16.0))
                .build_cartesian_2d(lo..hi, category_axis(n))
                .map_err(config_err)?;
            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(category_ticks(n))
                .x_desc(value_desc)
                .y_desc(category_desc)
                .y_label_formatter(&|v| category_label(&labels, *v))
                .x_label_formatter(&|v| compact(*v))
                .label_style(("sans-serif", figure.font(10.0)))
                .axis_desc_style(("sans-serif", figure.font(11.0)))
                .draw()
                .map_err(draw_err)?;
            draw_boxes(&mut chart, &summaries, &slots, figure, |c, v| (v, c))?;
        }
    }

    root.present().map_err(draw_err)?;
    debug!("Wrote {} letter-value groups to {}", n, output_path.display());
    Ok(())
}

fn value_span(summaries: &[(&str, LetterValues)]) -> (f64, f64) {
    let (lo, hi) = summaries
        .iter()
        .map(|(_, lv)| lv.range())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| {
            (lo.min(a), hi.max(b))
        });
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    (lo - pad, hi + pad)
}

/// `place(category, value)` maps to chart coordinates, which lets one
/// routine serve both orientations.
fn draw_boxes<'a, DB, CT>(
    chart: &mut ChartContext<'a, DB, CT>,
    summaries: &[(&str, LetterValues)],
    slots: &[f64],
    figure: &Figure,
    place: impl Fn(f64, f64) -> (f64, f64),
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    CT: CoordTranslate<From = (f64, f64)>,
{
    let radius = figure.points(1.5);
    for (g, ((_, lv), &slot)) in summaries.iter().zip(slots).enumerate() {
        let base = deep(g);
        let k = lv.depth();
        // outermost first so the inner boxes paint over it
        for (i, &(lower, upper)) in lv.boxes.iter().enumerate().rev() {
            let half = BOX_WIDTH * (k - i) as f64 / k as f64 / 2.0;
            let shade = lighten(base, 0.75 * i as f64 / k as f64);
            let corners = [place(slot - half, lower), place(slot + half, upper)];
            chart
                .draw_series(std::iter::once(Rectangle::new(corners, shade.filled())))
                .map_err(draw_err)?;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    corners,
                    WHITE.stroke_width(1),
                )))
                .map_err(draw_err)?;
        }

        let half = BOX_WIDTH / 2.0;
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![place(slot - half, lv.median), place(slot + half, lv.median)],
                BLACK.mix(0.8).stroke_width(figure.points(1.0)),
            )))
            .map_err(draw_err)?;
        chart
            .draw_series(
                lv.outliers
                    .iter()
                    .map(|&o| Circle::new(place(slot, o), radius, base.mix(0.8).filled())),
            )
            .map_err(draw_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rejects_groups_without_values() {
        let dir = tempdir().unwrap();
        let groups = vec![("false".to_string(), vec![]), ("true".to_string(), vec![f64::NAN])];
        let result = boxen_chart(
            &groups,
            Orientation::Vertical,
            "Nameplate Capacity",
            "Third Party",
            "kW",
            &dir.path().join("b.png"),
            &Figure::standard(50),
        );
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
    }

    #[test]
    fn span_covers_outliers_with_padding() {
        let values: Vec<f64> = (1..=100).map(f64::from).chain([500.0]).collect();
        let lv = letter_values(&values).unwrap();
        let (lo, hi) = value_span(&[("a", lv)]);
        assert!(lo < 1.0);
        assert!(hi > 500.0);
    }

    #[test]
    fn renders_both_orientations() {
        let dir = tempdir().unwrap();
        let groups: Vec<(String, Vec<f64>)> = (2008..2012)
            .map(|year| {
                let values = (0..300).map(|i| (i % 41) as f64 * 0.2 + (year - 2008) as f64).collect();
                (year.to_string(), values)
            })
            .collect();
        for (orientation, name) in [
            (Orientation::Vertical, "res_boxen_all.png"),
            (Orientation::Horizontal, "res_boxen_year.png"),
        ] {
            let path = dir.path().join(name);
            boxen_chart(
                &groups,
                orientation,
                "Nameplate Capacity by Year",
                "Year",
                "kW",
                &path,
                &Figure::standard(60),
            )
            .unwrap();
            assert!(path.exists());
        }
    }
}
