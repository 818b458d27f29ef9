//! Configuration for area-to-magnitude scaling.

use serde::{Deserialize, Serialize};

/// Faulting regime selected from a rake angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlipRegime {
    /// Rake near 0° or ±180°.
    StrikeSlip,
    /// Rake near ±90° (reverse or normal).
    DipSlip,
}

impl SlipRegime {
    /// Classifies a rake in degrees.
    ///
    /// The rake is wrapped into [0, 360) and snapped to the nearest multiple of
    /// 90° (ties to even); odd multiples are dip-slip.
    pub fn from_rake(rake_deg: f64) -> Self {
        let quadrant = (rake_deg.rem_euclid(360.0) / 90.0).round_ties_even() as i64;
        if quadrant % 2 == 1 {
            SlipRegime::DipSlip
        } else {
            SlipRegime::StrikeSlip
        }
    }
}

/// Coefficients of the Leonard (2014) area scaling law `Mw = log10(A) + b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingConfig {
    /// Intercept `b` used for dip-slip ruptures.
    pub dip_slip_intercept: f64,
    /// Intercept `b` used for strike-slip ruptures.
    pub strike_slip_intercept: f64,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self::leonard_2014()
    }
}

impl ScalingConfig {
    /// Interplate crustal coefficients from Leonard (2014).
    pub const fn leonard_2014() -> Self {
        Self {
            dip_slip_intercept: 4.0,
            strike_slip_intercept: 3.99,
        }
    }

    /// Returns the intercept for a faulting regime.
    pub fn intercept(&self, regime: SlipRegime) -> f64 {
        match regime {
            SlipRegime::DipSlip => self.dip_slip_intercept,
            SlipRegime::StrikeSlip => self.strike_slip_intercept,
        }
    }
}
