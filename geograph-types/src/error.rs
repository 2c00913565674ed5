//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error, PartialEq)]
pub enum GeographTypesError {
    /// A coordinate has a NaN or infinite component.
    #[error("coordinate ({x}, {y}) is not finite")]
    NonFinite {
        /// X component of the offending coordinate.
        x: f64,
        /// Y component of the offending coordinate.
        y: f64,
    },
}
