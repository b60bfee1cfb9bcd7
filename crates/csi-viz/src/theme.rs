//! Figure geometry and colour palettes.
//!
//! Sizes are given in inches and converted with the figure's DPI, so a
//! 6.4 x 4.8 inch figure at 300 DPI renders to 1920 x 1440 pixels and a
//! 10 pt label is drawn roughly 42 pixels tall.

use plotters::style::RGBColor;

pub const DEFAULT_DPI: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Figure {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new(6.4, 4.8, DEFAULT_DPI)
    }
}

impl Figure {
    pub const fn new(width_in: f64, height_in: f64, dpi: u32) -> Self {
        Self {
            width_in,
            height_in,
            dpi,
        }
    }

    /// Single-panel figure.
    pub fn standard(dpi: u32) -> Self {
        Self::new(6.4, 4.8, dpi)
    }

    /// Square figure used for category count charts.
    pub fn square(dpi: u32) -> Self {
        Self::new(5.0, 5.0, dpi)
    }

    /// Larger square figure for the joint hexbin plot and its marginals.
    pub fn joint(dpi: u32) -> Self {
        Self::new(6.0, 6.0, dpi)
    }

    pub fn pixels(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Length in pixels of `pt` typographic points.
    pub fn points(&self, pt: f64) -> u32 {
        self.font(pt).round().max(1.0) as u32
    }

    /// Font size in pixels for a `pt`-point font.
    pub fn font(&self, pt: f64) -> f64 {
        pt * self.dpi as f64 / 72.0
    }

    /// Room for a row of category labels, estimated from the longest one.
    pub fn label_width(&self, labels: &[String], pt: f64) -> u32 {
        let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        (self.font(pt) * (0.6 * longest as f64 + 2.5)).round() as u32
    }
}

/// Categorical palette used for hue groups (seaborn "deep").
pub const DEEP: [RGBColor; 10] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
    RGBColor(218, 139, 195),
    RGBColor(140, 140, 140),
    RGBColor(204, 185, 116),
    RGBColor(100, 181, 205),
];

pub fn deep(index: usize) -> RGBColor {
    DEEP[index % DEEP.len()]
}

/// Anchors of the sequential green-to-indigo "crest" ramp.
const CREST: [RGBColor; 3] = [
    RGBColor(165, 205, 144),
    RGBColor(44, 140, 145),
    RGBColor(44, 49, 114),
];

/// `n` colours evenly spaced along the crest ramp, light to dark.
pub fn crest(n: usize) -> Vec<RGBColor> {
    match n {
        0 => Vec::new(),
        1 => vec![CREST[1]],
        _ => (0..n)
            .map(|i| ramp(&CREST, i as f64 / (n - 1) as f64))
            .collect(),
    }
}

/// Sequential blue ramp for density shading; `t` in `[0, 1]`.
pub fn heat(t: f64) -> RGBColor {
    const BLUES: [RGBColor; 3] = [
        RGBColor(222, 235, 247),
        RGBColor(107, 174, 214),
        RGBColor(8, 48, 107),
    ];
    ramp(&BLUES, t)
}

/// Mix `color` toward white by `amount` in `[0, 1]`.
pub fn lighten(color: RGBColor, amount: f64) -> RGBColor {
    lerp(color, RGBColor(255, 255, 255), amount)
}

fn ramp(anchors: &[RGBColor], t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let segments = (anchors.len() - 1) as f64;
    let pos = t * segments;
    let idx = (pos.floor() as usize).min(anchors.len() - 2);
    lerp(anchors[idx], anchors[idx + 1], pos - idx as f64)
}

fn lerp(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_scale_with_dpi() {
        assert_eq!(Figure::standard(300).pixels(), (1920, 1440));
        assert_eq!(Figure::standard(100).pixels(), (640, 480));
        assert_eq!(Figure::joint(300).pixels(), (1800, 1800));
        assert_eq!(Figure::standard(72).points(10.0), 10);
        assert_eq!(Figure::standard(144).font(10.0), 20.0);
    }

    #[test]
    fn crest_runs_light_to_dark() {
        let colors = crest(3);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], CREST[0]);
        assert_eq!(colors[1], CREST[1]);
        assert_eq!(colors[2], CREST[2]);
        assert_eq!(crest(1), vec![CREST[1]]);
        assert!(crest(0).is_empty());
    }

    #[test]
    fn heat_is_clamped() {
        assert_eq!(heat(-1.0), heat(0.0));
        assert_eq!(heat(2.0), RGBColor(8, 48, 107));
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(deep(0), deep(10));
        assert_eq!(lighten(RGBColor(0, 0, 0), 1.0), RGBColor(255, 255, 255));
    }
}
