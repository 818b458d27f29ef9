//! Magnitude scaling relations.
//!
//! Converts rupture area to moment magnitude (Leonard 2014) and moment
//! magnitude to seismic moment and back (Hanks & Kanamori).

mod config;
mod magnitude;

pub use config::{ScalingConfig, SlipRegime};
pub use magnitude::{
    magnitude_to_moment, moment_to_magnitude, MagnitudeEstimator, ScalingError,
    MOMENT_MAGNITUDE_CONSTANT,
};
