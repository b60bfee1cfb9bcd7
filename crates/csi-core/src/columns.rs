//! Column names of the CSI application table.

pub const APP_STATUS: &str = "app_status";
pub const SECTOR: &str = "sector";
pub const STATE: &str = "state";
pub const INST_STATUS: &str = "inst_status";
pub const TYPE: &str = "type";
pub const THIRD_PARTY: &str = "third_party";
pub const YEAR: &str = "year";
/// Nameplate capacity in kW.
pub const NAMEPLATE: &str = "nameplate";
/// Total installed cost in dollars.
pub const TOTAL_COST: &str = "total_cost";

/// Categorical columns tabulated during inspection, in report order.
pub const CATEGORICAL: [&str; 5] = [APP_STATUS, SECTOR, STATE, INST_STATUS, TYPE];

/// Numeric columns that must be present for size and cost analysis.
pub const SIZE_AND_COST: [&str; 2] = [NAMEPLATE, TOTAL_COST];

pub const RESIDENTIAL: &str = "Residential";
pub const COMPLETED: &str = "Completed";
pub const INSTALLED: &str = "Installed";

/// Every column the pipeline reads.
pub fn required() -> Vec<&'static str> {
    let mut cols = CATEGORICAL.to_vec();
    cols.extend([THIRD_PARTY, YEAR, NAMEPLATE, TOTAL_COST]);
    cols
}
