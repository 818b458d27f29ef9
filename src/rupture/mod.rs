//! Rupture data contracts shared by the catalogue, attribution and rendering
//! layers.

mod fault_map;
mod model;

pub use fault_map::FaultMap;
pub use model::{FaultInfo, MagnitudeFrequency, MfdBin, Rupture, RuptureId};
