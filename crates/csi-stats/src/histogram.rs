//! Histogram binning.
//!
//! Edges follow numpy semantics: `n` equal-width bins spanning the data
//! range, every bin half-open except the last, which also holds the maximum.

use crate::quantile::{iqr_sorted, sorted_finite};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinRule {
    /// Fixed number of equal-width bins.
    Count(usize),
    /// Narrower of the Sturges and Freedman-Diaconis widths.
    Auto,
}

impl Default for BinRule {
    fn default() -> Self {
        BinRule::Count(10)
    }
}

impl BinRule {
    /// Bin edges for `values`. Empty when there is no finite value.
    pub fn edges(self, values: &[f64]) -> Vec<f64> {
        let sorted = sorted_finite(values);
        let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
            return Vec::new();
        };
        let (lo, hi) = if first == last {
            (first - 0.5, last + 0.5)
        } else {
            (first, last)
        };
        let bins = match self {
            BinRule::Count(n) => n.max(1),
            BinRule::Auto => auto_bins(&sorted, hi - lo),
        };
        linspace(lo, hi, bins + 1)
    }
}

fn auto_bins(sorted: &[f64], span: f64) -> usize {
    let n = sorted.len() as f64;
    if span <= 0.0 || sorted.len() < 2 {
        return 1;
    }
    let sturges = span / (n.log2() + 1.0);
    let fd = iqr_sorted(sorted).map_or(0.0, |iqr| 2.0 * iqr * n.powf(-1.0 / 3.0));
    let width = if fd > 0.0 { fd.min(sturges) } else { sturges };
    ((span / width).ceil() as usize).max(1)
}

fn linspace(start: f64, stop: f64, points: usize) -> Vec<f64> {
    if points < 2 {
        return vec![start];
    }
    let step = (stop - start) / (points - 1) as f64;
    (0..points)
        .map(|i| {
            if i == points - 1 {
                stop
            } else {
                start + step * i as f64
            }
        })
        .collect()
}

/// Bin count seaborn uses for joint plots: `ceil(range / h)` with
/// `h = 2 * IQR / n^(1/3)`, or `sqrt(n)` when the IQR is zero.
pub fn freedman_diaconis_bins(values: &[f64]) -> usize {
    let sorted = sorted_finite(values);
    if sorted.len() < 2 {
        return 1;
    }
    let n = sorted.len() as f64;
    let h = iqr_sorted(&sorted).map_or(0.0, |iqr| 2.0 * iqr / n.cbrt());
    if h == 0.0 {
        (n.sqrt() as usize).max(1)
    } else {
        let span = sorted[sorted.len() - 1] - sorted[0];
        ((span / h).ceil() as usize).max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn from_values(values: &[f64], rule: BinRule) -> Self {
        let edges = rule.edges(values);
        Self::with_edges(values, edges)
    }

    /// Count `values` into pre-computed `edges`, e.g. edges shared by several
    /// groups. Values outside the edges are not counted.
    pub fn with_edges(values: &[f64], edges: Vec<f64>) -> Self {
        let bins = edges.len().saturating_sub(1);
        let mut counts = vec![0usize; bins];
        if bins > 0 {
            let lo = edges[0];
            let hi = edges[bins];
            for &v in values.iter().filter(|v| v.is_finite()) {
                if v < lo || v > hi {
                    continue;
                }
                // partition_point finds the first edge strictly greater than v
                let idx = edges.partition_point(|&e| e <= v).saturating_sub(1);
                counts[idx.min(bins - 1)] += 1;
            }
        }
        Self { edges, counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Width of the first bin; all bins share it.
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [a, b, ..] => b - a,
            _ => 0.0,
        }
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        Some((*self.edges.first()?, *self.edges.last()?))
    }

    /// `(left, right, count)` for each bin.
    pub fn bars(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(w, &c)| (w[0], w[1], c))
    }
}
