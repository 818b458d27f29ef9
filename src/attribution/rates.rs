//! Rate attribution policies.
//!
//! A rupture's annual rate belongs to the rupture as a whole. For display it
//! is spread across the faults according to a [`RatePolicy`]. Every policy
//! reports an explicit entry (possibly zero) for each fault of the rupture.

use serde::{Deserialize, Serialize};

use super::error::AttributionError;
use super::magnitudes::MagnitudeAttribution;
use crate::rupture::{FaultInfo, FaultMap, Rupture};

/// Attributed annual rate per fault.
pub type RateAttribution = FaultMap<f64>;

/// Strategy for distributing a rupture's rate across its faults.
///
/// Implementations must be pure: the result depends only on the arguments, is
/// non-negative, and gives zero to faults with zero planes.
pub trait RatePolicy: Send + Sync {
    /// Returns a short identifier for the policy.
    fn name(&self) -> &'static str;

    /// Attributes `rupture.rate` across `rupture.faults`.
    ///
    /// # Arguments
    /// * `rupture` - The rupture whose rate is distributed
    /// * `magnitudes` - Per-fault magnitude estimates
    /// * `fault_info` - Per-fault catalogue metadata (magnitude-frequency targets)
    fn attribute(
        &self,
        rupture: &Rupture,
        magnitudes: &MagnitudeAttribution,
        fault_info: &FaultMap<FaultInfo>,
    ) -> Result<RateAttribution, AttributionError>;
}

fn check_rupture(rupture: &Rupture) -> Result<(), AttributionError> {
    if rupture.faults.is_empty() {
        return Err(AttributionError::EmptyRupture);
    }
    if !(rupture.rate > 0.0) {
        return Err(AttributionError::NonPositiveRate(rupture.rate));
    }
    Ok(())
}

/// Splits `rate` across the faults selected by `eligible`, weighted by plane
/// count. Unselected faults get an explicit zero.
fn split_by_planes(rupture: &Rupture, rate: f64, eligible: impl Fn(&str) -> bool) -> RateAttribution {
    let total_planes: usize = rupture
        .faults
        .iter()
        .filter(|&(name, _)| eligible(name))
        .map(|(_, fault)| fault.plane_count)
        .sum();

    rupture.faults.map_values(|name, fault| {
        if total_planes == 0 || !eligible(name) {
            0.0
        } else {
            rate * fault.plane_count as f64 / total_planes as f64
        }
    })
}

/// Divides the rupture rate evenly per plane across all faults.
///
/// A fault with `k` of the rupture's `n` planes receives `rate * k / n`, so
/// every plane carries the same `rate / n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvenPerPlane;

impl RatePolicy for EvenPerPlane {
    fn name(&self) -> &'static str {
        "even_per_plane"
    }

    fn attribute(
        &self,
        rupture: &Rupture,
        _magnitudes: &MagnitudeAttribution,
        _fault_info: &FaultMap<FaultInfo>,
    ) -> Result<RateAttribution, AttributionError> {
        check_rupture(rupture)?;
        Ok(split_by_planes(rupture, rupture.rate, |_| true))
    }
}

/// Gives the whole rupture rate to the most likely fault.
///
/// Each fault's likelihood is the rate its magnitude-frequency target assigns
/// to the fault's estimated magnitude. The full rate goes to the fault (or
/// tied faults, split by plane count) with the highest positive likelihood.
/// When no fault has a positive likelihood every fault reports zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrequencyMatched;

impl FrequencyMatched {
    /// Likelihood of each fault under its magnitude-frequency target.
    pub fn likelihoods(
        rupture: &Rupture,
        magnitudes: &MagnitudeAttribution,
        fault_info: &FaultMap<FaultInfo>,
    ) -> FaultMap<f64> {
        rupture.faults.map_values(|name, fault| {
            if fault.plane_count == 0 {
                return 0.0;
            }
            let magnitude = magnitudes.get(name).copied();
            let mfd = fault_info.get(name).and_then(|info| info.mfd.as_ref());
            match (magnitude, mfd) {
                (Some(m), Some(mfd)) => mfd.rate_at(m),
                _ => 0.0,
            }
        })
    }
}

impl RatePolicy for FrequencyMatched {
    fn name(&self) -> &'static str {
        "frequency_matched"
    }

    fn attribute(
        &self,
        rupture: &Rupture,
        magnitudes: &MagnitudeAttribution,
        fault_info: &FaultMap<FaultInfo>,
    ) -> Result<RateAttribution, AttributionError> {
        check_rupture(rupture)?;

        let likelihoods = Self::likelihoods(rupture, magnitudes, fault_info);
        let best = likelihoods.values().copied().fold(0.0_f64, f64::max);
        if best <= 0.0 {
            return Ok(rupture.faults.map_values(|_, _| 0.0));
        }

        Ok(split_by_planes(rupture, rupture.rate, |name| {
            likelihoods.get(name).copied() == Some(best)
        }))
    }
}

/// Named selection of a rate policy, suitable for configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePolicyKind {
    /// See [`EvenPerPlane`].
    #[default]
    EvenPerPlane,
    /// See [`FrequencyMatched`].
    FrequencyMatched,
}

impl RatePolicyKind {
    /// Returns the policy implementation for this kind.
    pub fn policy(&self) -> &'static dyn RatePolicy {
        match self {
            RatePolicyKind::EvenPerPlane => &EvenPerPlane,
            RatePolicyKind::FrequencyMatched => &FrequencyMatched,
        }
    }
}

impl RatePolicy for RatePolicyKind {
    fn name(&self) -> &'static str {
        self.policy().name()
    }

    fn attribute(
        &self,
        rupture: &Rupture,
        magnitudes: &MagnitudeAttribution,
        fault_info: &FaultMap<FaultInfo>,
    ) -> Result<RateAttribution, AttributionError> {
        self.policy().attribute(rupture, magnitudes, fault_info)
    }
}
