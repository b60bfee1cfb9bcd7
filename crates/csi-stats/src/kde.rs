//! Gaussian kernel density estimation with Scott's rule bandwidth.

use crate::quantile::{sample_std, sorted_finite};

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KdeOptions {
    /// Number of evaluation points.
    pub grid_size: usize,
    /// How far past the extreme data points to evaluate, in bandwidths.
    pub cut: f64,
    /// Multiplier on the Scott bandwidth.
    pub bw_adjust: f64,
}

impl Default for KdeOptions {
    fn default() -> Self {
        Self {
            grid_size: 200,
            cut: 3.0,
            bw_adjust: 1.0,
        }
    }
}

impl KdeOptions {
    /// Curve confined to the data range, as drawn over a histogram.
    pub fn clipped() -> Self {
        Self {
            cut: 0.0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Kde {
    sample: Vec<f64>,
    bandwidth: f64,
}

impl Kde {
    /// Fit to the finite values of `values`. `None` for fewer than two points
    /// or zero spread, where a Gaussian kernel has no defined width.
    pub fn fit(values: &[f64], bw_adjust: f64) -> Option<Self> {
        let sample = sorted_finite(values);
        let std = sample_std(&sample)?;
        if std <= 0.0 {
            return None;
        }
        let factor = (sample.len() as f64).powf(-0.2) * bw_adjust;
        Some(Self {
            sample,
            bandwidth: std * factor,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn density(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let sum: f64 = self
            .sample
            .iter()
            .map(|xi| {
                let z = (x - xi) / h;
                (-0.5 * z * z).exp()
            })
            .sum();
        sum * INV_SQRT_2PI / (self.sample.len() as f64 * h)
    }

    pub fn evaluate(&self, options: &KdeOptions) -> DensityCurve {
        let pad = options.cut * self.bandwidth;
        let lo = self.sample[0] - pad;
        let hi = self.sample[self.sample.len() - 1] + pad;
        let points = options.grid_size.max(2);
        let step = (hi - lo) / (points - 1) as f64;
        let x: Vec<f64> = (0..points).map(|i| lo + step * i as f64).collect();
        let y = x.iter().map(|&xi| self.density(xi)).collect();
        DensityCurve { x, y }
    }
}

/// Density evaluated on a regular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl DensityCurve {
    pub fn from_values(values: &[f64], options: &KdeOptions) -> Option<Self> {
        Kde::fit(values, options.bw_adjust).map(|kde| kde.evaluate(options))
    }

    /// Multiply every density by `factor`, e.g. `n * bin_width` to overlay a
    /// count histogram or a group's share of rows for a joint normalisation.
    pub fn scaled(mut self, factor: f64) -> Self {
        for y in &mut self.y {
            *y *= factor;
        }
        self
    }

    pub fn max_density(&self) -> f64 {
        self.y.iter().copied().fold(0.0, f64::max)
    }

    pub fn x_range(&self) -> Option<(f64, f64)> {
        Some((*self.x.first()?, *self.x.last()?))
    }

    /// Trapezoid-rule area under the curve.
    pub fn area(&self) -> f64 {
        self.x
            .windows(2)
            .zip(self.y.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
            .sum()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}
