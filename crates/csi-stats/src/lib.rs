//! # csi-stats: transforms and summary statistics for installation records
//!
//! Two layers live here:
//!
//! - **Frame operations** ([`frame`], [`filter`]) work on polars
//!   `DataFrame`s: categorical filtering, integer coercion, missing-value
//!   removal, percentile trimming, and extraction of plain `f64` vectors.
//! - **Numeric kernels** ([`quantile`], [`histogram`], [`kde`],
//!   [`letter_value`], [`hexbin`]) take slices and return the geometry a
//!   chart needs. They know nothing about columns.
//!
//! Every frame operation returns a new frame; inputs are never mutated.

pub mod filter;
pub mod frame;
pub mod hexbin;
pub mod histogram;
pub mod kde;
pub mod letter_value;
pub mod quantile;

pub use filter::{
    apply_filters, coerce_year, drop_missing, outlier_thresholds, through_year, trim_outliers,
    FilterCriteria, FilterReport, FilterStep, OutlierThresholds,
};
pub use frame::{grouped_values, numeric_values, paired_values, value_counts};
pub use hexbin::{hexbin, joint_gridsize, HexBinning, HexCell, HexGrid};
pub use histogram::{freedman_diaconis_bins, BinRule, Histogram};
pub use kde::{DensityCurve, Kde, KdeOptions};
pub use letter_value::{letter_values, LetterValues};
pub use quantile::{quantile, quantile_sorted, sorted_finite, Summary};
