//! Errors raised by the attribution pipeline.

use thiserror::Error;

use crate::scaling::ScalingError;

/// Errors that can occur while attributing magnitude or rate to faults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributionError {
    #[error(transparent)]
    InvalidInput(#[from] ScalingError),
    #[error("Rupture has no fault area to attribute")]
    EmptyRupture,
    #[error("No rake recorded for fault '{0}'")]
    MissingRake(String),
    #[error("Rupture rate must be positive, got {0}")]
    NonPositiveRate(f64),
}
