//! Unit newtypes for the two quantities the analysis trims on.
//!
//! Nameplate capacity and installed cost both arrive as bare `f64` columns.
//! Reported thresholds are wrapped so that a capacity can never be compared
//! against a cost by accident and so they print with their unit.
//!
//! ```
//! use csi_core::units::{Dollars, Kilowatts};
//!
//! let kw = Kilowatts(8.0);
//! assert_eq!(kw.value(), 8.0);
//! assert_eq!(kw.to_string(), "8.00 kW");
//! assert_eq!(Dollars(48000.0).per_watt(kw), Some(6.0));
//! assert_eq!(Dollars(45678.9).to_string(), "$45,678.90");
//! ```

use serde::{Deserialize, Serialize};

macro_rules! impl_unit_value {
    ($type:ty) => {
        impl $type {
            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }
        }
    };
}

/// Nameplate (DC) capacity in kilowatts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilowatts(pub f64);

impl_unit_value!(Kilowatts);

impl std::fmt::Display for Kilowatts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} kW", self.0)
    }
}

/// Currency amount in US dollars.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Dollars(pub f64);

impl_unit_value!(Dollars);

impl Dollars {
    /// Installed cost per watt of nameplate capacity.
    pub fn per_watt(self, capacity: Kilowatts) -> Option<f64> {
        if capacity.0 > 0.0 {
            Some(self.0 / (capacity.0 * 1000.0))
        } else {
            None
        }
    }
}

impl std::fmt::Display for Dollars {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cents = (self.0.abs() * 100.0).round() as u64;
        let whole = (cents / 100).to_string();
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0.0 { "-" } else { "" };
        write!(f, "{sign}${grouped}.{:02}", cents % 100)
    }
}
