//! Rupture attributor: magnitude and rate attribution for one rupture.

use serde::{Deserialize, Serialize};

use super::error::AttributionError;
use super::magnitudes::{estimate_fault_magnitudes, MagnitudeAttribution};
use super::rates::{RateAttribution, RatePolicy, RatePolicyKind};
use crate::geometry::FaultSegment;
use crate::rupture::{FaultInfo, FaultMap, Rupture, RuptureId};
use crate::scaling::{MagnitudeEstimator, ScalingConfig};

/// Combined magnitude and rate attribution for a rupture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuptureAttribution {
    pub rupture_id: RuptureId,
    /// Policy that produced `rates`.
    pub policy: RatePolicyKind,
    /// Estimated magnitude per fault.
    pub magnitudes: MagnitudeAttribution,
    /// Attributed annual rate per fault.
    pub rates: RateAttribution,
}

/// Stateless attribution service.
///
/// Holds only immutable configuration, so a single instance can be shared
/// across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RuptureAttributor {
    estimator: MagnitudeEstimator,
    policy: RatePolicyKind,
}

impl RuptureAttributor {
    pub fn new(scaling: ScalingConfig, policy: RatePolicyKind) -> Self {
        Self {
            estimator: MagnitudeEstimator::new(scaling),
            policy,
        }
    }

    pub fn estimator(&self) -> &MagnitudeEstimator {
        &self.estimator
    }

    pub fn policy(&self) -> RatePolicyKind {
        self.policy
    }

    /// Estimates per-fault magnitudes; see [`estimate_fault_magnitudes`].
    pub fn estimate_fault_magnitudes(
        &self,
        faults: &FaultMap<FaultSegment>,
        rakes: &FaultMap<f64>,
    ) -> Result<MagnitudeAttribution, AttributionError> {
        estimate_fault_magnitudes(&self.estimator, faults, rakes)
    }

    /// Attributes the rupture rate across faults using the configured policy.
    pub fn attribute_rates(
        &self,
        rupture: &Rupture,
        magnitudes: &MagnitudeAttribution,
        fault_info: &FaultMap<FaultInfo>,
    ) -> Result<RateAttribution, AttributionError> {
        self.policy.attribute(rupture, magnitudes, fault_info)
    }

    /// Runs magnitude and rate attribution for a rupture.
    ///
    /// Rakes are taken from `fault_info` for the rupture's own faults; a fault
    /// without a record fails with [`AttributionError::MissingRake`].
    pub fn attribute(
        &self,
        rupture: &Rupture,
        fault_info: &FaultMap<FaultInfo>,
    ) -> Result<RuptureAttribution, AttributionError> {
        let rakes: FaultMap<f64> = rupture
            .faults
            .keys()
            .filter_map(|name| fault_info.get(name).map(|info| (name, info.rake)))
            .collect();

        let magnitudes = self.estimate_fault_magnitudes(&rupture.faults, &rakes)?;
        let rates = self.attribute_rates(rupture, &magnitudes, fault_info)?;

        Ok(RuptureAttribution {
            rupture_id: rupture.id,
            policy: self.policy,
            magnitudes,
            rates,
        })
    }
}
