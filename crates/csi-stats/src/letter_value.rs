//! Letter-value summaries (the geometry behind "boxen" plots).
//!
//! A letter-value plot extends the box plot with successively narrower boxes
//! for the eighths, sixteenths, and so on. Box `i` (1-based) spans the
//! `0.5^(i+1)` and `1 - 0.5^(i+1)` quantiles, so box 1 is the interquartile
//! box. The number of boxes follows Tukey's rule, `floor(log2 n) - 3`, with
//! at least one box; values outside the outermost box are outliers.

use serde::Serialize;

use crate::quantile::{quantile_sorted, sorted_finite};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterValues {
    pub count: usize,
    pub median: f64,
    /// `(lower, upper)` per depth, innermost first.
    pub boxes: Vec<(f64, f64)>,
    pub outliers: Vec<f64>,
}

impl LetterValues {
    pub fn depth(&self) -> usize {
        self.boxes.len()
    }

    /// Full extent including outliers.
    pub fn range(&self) -> (f64, f64) {
        let (mut lo, mut hi) = self.boxes.last().copied().unwrap_or((self.median, self.median));
        for &o in &self.outliers {
            lo = lo.min(o);
            hi = hi.max(o);
        }
        (lo, hi)
    }
}

pub fn tukey_depth(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let log2 = (n as f64).log2().floor() as i64;
    (log2 - 3).max(1) as usize
}

pub fn letter_values(values: &[f64]) -> Option<LetterValues> {
    let sorted = sorted_finite(values);
    let median = quantile_sorted(&sorted, 0.5)?;
    let depth = tukey_depth(sorted.len());
    let mut boxes = Vec::with_capacity(depth);
    for i in 1..=depth {
        let tail = 0.5f64.powi(i as i32 + 1);
        boxes.push((
            quantile_sorted(&sorted, tail)?,
            quantile_sorted(&sorted, 1.0 - tail)?,
        ));
    }
    let (lo, hi) = boxes.last().copied().unwrap_or((median, median));
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < lo || v > hi)
        .collect();
    Some(LetterValues {
        count: sorted.len(),
        median,
        boxes,
        outliers,
    })
}
