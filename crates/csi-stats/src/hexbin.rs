//! Hexagonal binning of paired observations.
//!
//! Centres lie on two interleaved rectangular lattices: lattice A at
//! `(i * sx, j * sy)` and lattice B offset by half a cell in both
//! directions. A point goes to whichever nearest lattice node is closer once
//! the y distance is weighted by 3, which yields pointy-top hexagons when the
//! row count is `nx / sqrt(3)`.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::histogram::freedman_diaconis_bins;

/// Upper bound on the per-axis bin count when sizing a joint plot grid.
const MAX_JOINT_BINS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HexGrid {
    pub nx: usize,
    pub ny: usize,
    pub x_min: f64,
    pub y_min: f64,
    /// Horizontal distance between centres in one lattice row.
    pub sx: f64,
    /// Vertical distance between lattice A rows.
    pub sy: f64,
}

impl HexGrid {
    fn new(gridsize: usize, x: (f64, f64), y: (f64, f64)) -> Self {
        let nx = gridsize.max(1);
        let ny = ((nx as f64 / 3f64.sqrt()) as usize).max(1);
        let (x_min, x_max) = pad_range(x);
        let (y_min, y_max) = pad_range(y);
        Self {
            nx,
            ny,
            x_min,
            y_min,
            sx: (x_max - x_min) / nx as f64,
            sy: (y_max - y_min) / ny as f64,
        }
    }

    fn locate(&self, x: f64, y: f64) -> CellKey {
        let ix = (x - self.x_min) / self.sx;
        let iy = (y - self.y_min) / self.sy;
        let (ix1, iy1) = (ix.round(), iy.round());
        let (ix2, iy2) = (ix.floor(), iy.floor());
        let d1 = (ix - ix1).powi(2) + 3.0 * (iy - iy1).powi(2);
        let d2 = (ix - ix2 - 0.5).powi(2) + 3.0 * (iy - iy2 - 0.5).powi(2);
        if d1 < d2 {
            CellKey {
                offset: false,
                i: ix1 as i64,
                j: iy1 as i64,
            }
        } else {
            CellKey {
                offset: true,
                i: ix2 as i64,
                j: iy2 as i64,
            }
        }
    }

    fn center(&self, key: CellKey) -> (f64, f64) {
        let shift = if key.offset { 0.5 } else { 0.0 };
        (
            self.x_min + (key.i as f64 + shift) * self.sx,
            self.y_min + (key.j as f64 + shift) * self.sy,
        )
    }

    /// Vertices of the hexagon around `center`, counter-clockwise from the
    /// lower right.
    pub fn hexagon(&self, center: (f64, f64)) -> [(f64, f64); 6] {
        let (cx, cy) = center;
        let hx = 0.5 * self.sx;
        let hy = self.sy / 6.0;
        [
            (cx + hx, cy - hy),
            (cx + hx, cy + hy),
            (cx, cy + 2.0 * hy),
            (cx - hx, cy + hy),
            (cx - hx, cy - hy),
            (cx, cy - 2.0 * hy),
        ]
    }
}

fn pad_range((lo, hi): (f64, f64)) -> (f64, f64) {
    if lo == hi {
        (lo - 0.1, hi + 0.1)
    } else {
        let pad = 1e-9 * (hi - lo);
        (lo - pad, hi + pad)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct CellKey {
    offset: bool,
    i: i64,
    j: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HexCell {
    pub center: (f64, f64),
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HexBinning {
    pub grid: HexGrid,
    /// Occupied cells only.
    pub cells: Vec<HexCell>,
}

impl HexBinning {
    pub fn max_count(&self) -> usize {
        self.cells.iter().map(|c| c.count).max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.cells.iter().map(|c| c.count).sum()
    }
}

/// Bin paired `(x[i], y[i])` points into `gridsize` hexagons across.
///
/// Pairs with a non-finite member are skipped. `None` when no pair survives
/// or the slices differ in length.
pub fn hexbin(x: &[f64], y: &[f64], gridsize: usize) -> Option<HexBinning> {
    if x.len() != y.len() {
        return None;
    }
    let points: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .map(|(&a, &b)| (a, b))
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .collect();
    if points.is_empty() {
        return None;
    }
    let x_range = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.0), hi.max(p.0))
        });
    let y_range = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.1), hi.max(p.1))
        });
    let grid = HexGrid::new(gridsize, x_range, y_range);

    let mut counts: BTreeMap<CellKey, usize> = BTreeMap::new();
    for &(px, py) in &points {
        *counts.entry(grid.locate(px, py)).or_default() += 1;
    }
    debug!(
        "Hexbin {}x{} grid: {} points in {} occupied cells",
        grid.nx,
        grid.ny,
        points.len(),
        counts.len()
    );
    let cells = counts
        .into_iter()
        .map(|(key, count)| HexCell {
            center: grid.center(key),
            count,
        })
        .collect();
    Some(HexBinning { grid, cells })
}

/// Grid size for a joint hexbin plot: the mean of both axes'
/// Freedman-Diaconis bin counts, each capped at 50.
pub fn joint_gridsize(x: &[f64], y: &[f64]) -> usize {
    let bx = freedman_diaconis_bins(x).min(MAX_JOINT_BINS);
    let by = freedman_diaconis_bins(y).min(MAX_JOINT_BINS);
    ((bx + by) as f64 / 2.0) as usize
}
