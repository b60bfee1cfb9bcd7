//! Unified error type for the CSI analysis crates
//!
//! [`CsiError`] covers the two failure families a one-shot analysis run can
//! hit: I/O trouble reading the input, and data that does not have the shape
//! the pipeline expects (missing columns, empty selections, values that
//! cannot be coerced). Library code usually returns `anyhow::Result` with a
//! `CsiError` inside so callers can still `downcast_ref` for the kind.
//!
//! # Example
//!
//! ```
//! use csi_core::CsiError;
//!
//! fn require_rows(rows: usize) -> Result<usize, CsiError> {
//!     if rows == 0 {
//!         return Err(CsiError::EmptySelection("no completed residential records".into()));
//!     }
//!     Ok(rows)
//! }
//!
//! assert_eq!(require_rows(3).unwrap(), 3);
//! let err = require_rows(0).unwrap_err();
//! assert_eq!(err.to_string(), "Empty selection: no completed residential records");
//! ```

use thiserror::Error;

/// Error type for all CSI analysis operations.
#[derive(Error, Debug)]
pub enum CsiError {
    /// I/O errors (missing input, unreadable archive, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input could not be decoded as a table
    #[error("Parse error: {0}")]
    Parse(String),

    /// A column the pipeline reads is not present
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Values are present but unusable (e.g. a non-integral year)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A filter step left nothing to analyse
    #[error("Empty selection: {0}")]
    EmptySelection(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CsiError::MissingColumn("nameplate".into());
        assert!(err.to_string().contains("Missing column"));
        assert!(err.to_string().contains("nameplate"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let csi_err: CsiError = io_err.into();
        assert!(matches!(csi_err, CsiError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> Result<(), CsiError> {
            Err(CsiError::Validation("year".into()))
        }

        fn outer() -> Result<(), CsiError> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
