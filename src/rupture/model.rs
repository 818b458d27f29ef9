//! Rupture records and per-fault metadata supplied by the catalogue.

use serde::{Deserialize, Serialize};

use super::fault_map::FaultMap;
use crate::geometry::FaultSegment;

/// Catalogue-assigned rupture identifier.
pub type RuptureId = u64;

/// A single earthquake scenario: faults rupturing together, with the
/// catalogue's aggregate magnitude and annual rate.
///
/// Ruptures are never modified by the attribution or rendering layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rupture {
    pub id: RuptureId,
    /// Constituent faults in catalogue order.
    pub faults: FaultMap<FaultSegment>,
    /// Aggregate moment magnitude recorded in the catalogue.
    pub magnitude: f64,
    /// Annual occurrence rate.
    pub rate: f64,
}

impl Rupture {
    pub fn new(id: RuptureId, faults: FaultMap<FaultSegment>, magnitude: f64, rate: f64) -> Self {
        Self {
            id,
            faults,
            magnitude,
            rate,
        }
    }

    /// Total rupture area in km².
    pub fn area_km2(&self) -> f64 {
        self.faults.values().map(|f| f.area_km2).sum()
    }

    /// Total rupture length in km.
    pub fn length_km(&self) -> f64 {
        self.faults.values().map(|f| f.length_km).sum()
    }

    pub fn fault_count(&self) -> usize {
        self.faults.len()
    }

    /// Total number of planes across all faults.
    pub fn plane_count(&self) -> usize {
        self.faults.values().map(|f| f.plane_count).sum()
    }

    /// Returns the fault names in catalogue order.
    pub fn fault_names(&self) -> impl Iterator<Item = &str> {
        self.faults.keys()
    }

    /// Short description: the alphabetically first fault name, plus a count
    /// of the rest.
    pub fn fault_summary(&self) -> String {
        let mut names: Vec<&str> = self.faults.keys().collect();
        names.sort_unstable();
        match names.split_first() {
            None => String::new(),
            Some((first, [])) => first.to_string(),
            Some((first, rest)) => format!("{} + {} others", first, rest.len()),
        }
    }
}

/// One bin of a magnitude-frequency distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MfdBin {
    /// Bin centre magnitude.
    pub magnitude: f64,
    /// Annual rate of events in this bin.
    pub rate: f64,
}

fn default_bin_width() -> f64 {
    0.1
}

/// Per-fault magnitude-frequency distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeFrequency {
    /// Width of every bin in magnitude units.
    #[serde(default = "default_bin_width")]
    pub bin_width: f64,
    pub bins: Vec<MfdBin>,
}

impl MagnitudeFrequency {
    pub fn new(bin_width: f64, bins: Vec<MfdBin>) -> Self {
        Self { bin_width, bins }
    }

    /// Annual rate of the bin containing `magnitude`, or 0 outside all bins.
    ///
    /// Bins cover `[centre - width/2, centre + width/2)`.
    pub fn rate_at(&self, magnitude: f64) -> f64 {
        let half = self.bin_width / 2.0;
        self.bins
            .iter()
            .find(|bin| magnitude >= bin.magnitude - half && magnitude < bin.magnitude + half)
            .map(|bin| bin.rate.max(0.0))
            .unwrap_or(0.0)
    }
}

/// Per-fault catalogue metadata used at estimation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultInfo {
    /// Rake in degrees for this rupture's record of the fault.
    pub rake: f64,
    /// Optional magnitude-frequency target for the fault.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mfd: Option<MagnitudeFrequency>,
}

impl FaultInfo {
    pub fn with_rake(rake: f64) -> Self {
        Self { rake, mfd: None }
    }
}
