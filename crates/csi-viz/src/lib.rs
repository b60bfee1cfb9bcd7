//! Chart rendering for the CSI installation analysis.
//!
//! Every chart is a free function that takes plain data (already filtered
//! and split by the caller), a [`Figure`] describing size and resolution,
//! and an output path. PNG files are written with plotters' bitmap backend.

pub mod boxen;
mod category;
pub mod count;
pub mod error;
pub mod hexbin;
pub mod histogram;
pub mod kde;
pub mod theme;
pub mod violin;

pub use boxen::{boxen_chart, Orientation};
pub use count::count_chart;
pub use error::{PlotError, Result};
pub use hexbin::hexbin_joint;
pub use histogram::{histogram_pair, hue_histogram, Panel};
pub use kde::kde_overlay;
pub use theme::Figure;
pub use violin::split_violin;

/// Groups of values keyed by a hue or category label.
pub type Groups = [(String, Vec<f64>)];
