//! Moment magnitude estimation from rupture area.

use thiserror::Error;

use super::config::{ScalingConfig, SlipRegime};

/// Calibration constant `C` in `M0 = 10^(1.5 (Mw + C))`, with `M0` in N·m.
///
/// Equivalent to the Hanks & Kanamori form `log10(M0) = 1.5 Mw + 9.05`.
pub const MOMENT_MAGNITUDE_CONSTANT: f64 = 9.05 / 1.5;

/// Errors raised for out-of-domain numeric arguments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScalingError {
    #[error("Invalid {quantity}: {value}")]
    InvalidInput { quantity: &'static str, value: f64 },
}

fn require_finite(quantity: &'static str, value: f64) -> Result<f64, ScalingError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScalingError::InvalidInput { quantity, value })
    }
}

fn require_positive(quantity: &'static str, value: f64) -> Result<f64, ScalingError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ScalingError::InvalidInput { quantity, value })
    }
}

/// Converts a moment magnitude to seismic moment in N·m.
///
/// The result must be a normal `f64`, which bounds the magnitude to roughly
/// [-208, 199]. Magnitudes outside that range would overflow to infinity or
/// underflow to zero or a subnormal moment, and are reported as invalid.
pub fn magnitude_to_moment(magnitude: f64) -> Result<f64, ScalingError> {
    let magnitude = require_finite("magnitude", magnitude)?;
    let moment = 10f64.powf(1.5 * (magnitude + MOMENT_MAGNITUDE_CONSTANT));
    if moment.is_normal() {
        Ok(moment)
    } else {
        Err(ScalingError::InvalidInput {
            quantity: "magnitude",
            value: magnitude,
        })
    }
}

/// Converts a seismic moment in N·m to moment magnitude.
pub fn moment_to_magnitude(moment: f64) -> Result<f64, ScalingError> {
    let moment = require_positive("moment", moment)?;
    Ok(moment.log10() / 1.5 - MOMENT_MAGNITUDE_CONSTANT)
}

/// Estimates magnitudes from rupture area using a rake-dependent scaling law.
///
/// The estimator performs no clamping; callers decide what magnitude range is
/// sensible for display.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MagnitudeEstimator {
    config: ScalingConfig,
}

impl MagnitudeEstimator {
    pub fn new(config: ScalingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScalingConfig {
        &self.config
    }

    /// Estimates the moment magnitude of a rupture of `total_area_km2` with
    /// average rake `rake_deg`.
    ///
    /// # Arguments
    /// * `total_area_km2` - Total rupture area in km², must be positive
    /// * `rake_deg` - Average rake in degrees, selects strike-slip or dip-slip coefficients
    #[doc(alias = "moment_from_area")]
    pub fn magnitude_from_area(&self, total_area_km2: f64, rake_deg: f64) -> Result<f64, ScalingError> {
        let area = require_positive("area", total_area_km2)?;
        let rake = require_finite("rake", rake_deg)?;
        let regime = SlipRegime::from_rake(rake);
        Ok(area.log10() + self.config.intercept(regime))
    }

    /// Estimates the seismic moment in N·m of a rupture of `total_area_km2`.
    pub fn moment_from_area(&self, total_area_km2: f64, rake_deg: f64) -> Result<f64, ScalingError> {
        magnitude_to_moment(self.magnitude_from_area(total_area_km2, rake_deg)?)
    }

    pub fn magnitude_to_moment(&self, magnitude: f64) -> Result<f64, ScalingError> {
        magnitude_to_moment(magnitude)
    }

    pub fn moment_to_magnitude(&self, moment: f64) -> Result<f64, ScalingError> {
        moment_to_magnitude(moment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_roundtrip_magnitude_moment() {
        for &m in &[-2.0, 0.0, 4.5, 6.0, 7.8, 9.5, 12.0] {
            let back = moment_to_magnitude(magnitude_to_moment(m).unwrap()).unwrap();
            let tolerance = 1e-9 * m.abs().max(1.0);
            assert!((back - m).abs() <= tolerance, "{} -> {}", m, back);
        }
    }

    #[test]
    fn test_roundtrip_random_magnitudes() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..1000 {
            let m: f64 = rng.random_range(-5.0..15.0);
            let back = moment_to_magnitude(magnitude_to_moment(m).unwrap()).unwrap();
            assert!((back - m).abs() <= 1e-9 * m.abs().max(1.0));
        }
    }

    #[test]
    fn test_roundtrip_near_range_edges() {
        for &m in &[-200.0, 190.0] {
            let back = moment_to_magnitude(magnitude_to_moment(m).unwrap()).unwrap();
            assert!((back - m).abs() <= 1e-9 * m.abs(), "{} -> {}", m, back);
        }
    }

    #[test]
    fn test_hanks_kanamori_reference() {
        // Mw 6 corresponds to roughly 1.1e18 N·m.
        let moment = magnitude_to_moment(6.0).unwrap();
        assert!((moment.log10() - 18.05).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(magnitude_to_moment(f64::NAN).is_err());
        assert!(magnitude_to_moment(f64::INFINITY).is_err());
        assert_eq!(
            magnitude_to_moment(250.0),
            Err(ScalingError::InvalidInput { quantity: "magnitude", value: 250.0 })
        );
        assert_eq!(
            magnitude_to_moment(-250.0),
            Err(ScalingError::InvalidInput { quantity: "magnitude", value: -250.0 })
        );
        // Subnormal moments are rejected too.
        assert!(magnitude_to_moment(-215.0).is_err());
        assert!(moment_to_magnitude(0.0).is_err());
        assert!(moment_to_magnitude(-1.0).is_err());
        assert!(moment_to_magnitude(f64::INFINITY).is_err());

        let estimator = MagnitudeEstimator::default();
        assert!(estimator.magnitude_from_area(0.0, 0.0).is_err());
        assert!(estimator.magnitude_from_area(-10.0, 0.0).is_err());
        assert!(estimator.magnitude_from_area(100.0, f64::NAN).is_err());
    }

    #[test]
    fn test_reverse_fault_scenario() {
        let estimator = MagnitudeEstimator::default();
        let mw = estimator.magnitude_from_area(100.0, 90.0).unwrap();
        assert!((5.5..=6.5).contains(&mw), "Mw {} outside crustal range", mw);
        assert!((mw - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_strike_slip_coefficients() {
        let estimator = MagnitudeEstimator::default();
        let mw = estimator.magnitude_from_area(1000.0, 0.0).unwrap();
        assert!((mw - 6.99).abs() < 1e-12);
    }

    #[test]
    fn test_monotonic_in_area() {
        let estimator = MagnitudeEstimator::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let rake: f64 = rng.random_range(-180.0..=180.0);
            let a1: f64 = rng.random_range(1.0..10_000.0);
            let a2 = a1 + rng.random_range(0.0..10_000.0);
            let m1 = estimator.magnitude_from_area(a1, rake).unwrap();
            let m2 = estimator.magnitude_from_area(a2, rake).unwrap();
            assert!(m2 >= m1);
        }
    }

    #[test]
    fn test_no_clamping() {
        let estimator = MagnitudeEstimator::default();
        let tiny = estimator.magnitude_from_area(1e-6, 0.0).unwrap();
        assert!(tiny < 0.0);
    }
}
