//! # csi-core: shared vocabulary for the CSI installation analysis
//!
//! Column names, unit newtypes and the error type used by every other crate
//! in the workspace. Nothing here touches a dataframe; the crates that do
//! (`csi-io`, `csi-stats`) speak in terms of these names.

pub mod columns;
pub mod error;
pub mod units;

pub use error::CsiError;
pub use units::{Dollars, Kilowatts};
