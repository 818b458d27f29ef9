//! Rupture attribution pipeline.
//!
//! This module turns a rupture and its per-fault metadata into:
//! - Per-fault magnitudes, by partitioning the rupture's estimated seismic
//!   moment in proportion to fault area
//! - Per-fault rates, by distributing the rupture's annual rate with a
//!   pluggable [`RatePolicy`]
//!
//! Everything here is a pure function of its inputs except the optional
//! [`AttributionCache`].

mod error;
mod magnitudes;
mod rates;
mod attributor;
mod cache;

pub use error::AttributionError;
pub use magnitudes::{aggregate_magnitude, estimate_fault_magnitudes, total_moment, MagnitudeAttribution};
pub use rates::{EvenPerPlane, FrequencyMatched, RateAttribution, RatePolicy, RatePolicyKind};
pub use attributor::{RuptureAttribution, RuptureAttributor};
pub use cache::AttributionCache;
