//! Per-fault magnitude estimation by moment partitioning.

use super::error::AttributionError;
use crate::geometry::FaultSegment;
use crate::rupture::FaultMap;
use crate::scaling::{magnitude_to_moment, moment_to_magnitude, MagnitudeEstimator};

/// Estimated moment magnitude per fault.
pub type MagnitudeAttribution = FaultMap<f64>;

/// Estimates a magnitude for every fault in a rupture.
///
/// The rupture's overall magnitude comes from its total area and the mean of
/// all supplied rakes. The corresponding seismic moment is split across faults
/// in proportion to area and each share is converted back to a magnitude.
/// Moment is the additive quantity, so partitioning never happens in
/// magnitude space.
///
/// # Arguments
/// * `estimator` - Area scaling law
/// * `faults` - Faults to partition over
/// * `rakes` - Rake in degrees for every fault in `faults`
///
/// # Returns
/// A map with exactly the keys of `faults`, in the same order.
pub fn estimate_fault_magnitudes(
    estimator: &MagnitudeEstimator,
    faults: &FaultMap<FaultSegment>,
    rakes: &FaultMap<f64>,
) -> Result<MagnitudeAttribution, AttributionError> {
    let total_area: f64 = faults.values().map(|f| f.area_km2).sum();
    if faults.is_empty() || !(total_area > 0.0) {
        return Err(AttributionError::EmptyRupture);
    }

    if let Some(name) = faults.keys().find(|name| !rakes.contains_key(name)) {
        return Err(AttributionError::MissingRake(name.to_string()));
    }
    let avg_rake = rakes.values().sum::<f64>() / rakes.len() as f64;

    let estimated_mw = estimator.magnitude_from_area(total_area, avg_rake)?;
    let estimated_moment = magnitude_to_moment(estimated_mw)?;

    let mut magnitudes = MagnitudeAttribution::with_capacity(faults.len());
    for (name, fault) in faults.iter() {
        let share = fault.area_km2 / total_area;
        magnitudes.insert(name, moment_to_magnitude(share * estimated_moment)?);
    }
    Ok(magnitudes)
}

/// Total seismic moment of a magnitude attribution in N·m.
pub fn total_moment(magnitudes: &MagnitudeAttribution) -> Result<f64, AttributionError> {
    magnitudes
        .values()
        .map(|&m| magnitude_to_moment(m).map_err(AttributionError::from))
        .sum()
}

/// Moment-weighted aggregate magnitude of a set of per-fault magnitudes.
pub fn aggregate_magnitude(magnitudes: &MagnitudeAttribution) -> Result<f64, AttributionError> {
    if magnitudes.is_empty() {
        return Err(AttributionError::EmptyRupture);
    }
    Ok(moment_to_magnitude(total_moment(magnitudes)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn segment(area: f64) -> FaultSegment {
        FaultSegment::new(vec![], area, area / 10.0, 10.0, 1, 0.0).unwrap()
    }

    fn faults(areas: &[(&str, f64)]) -> FaultMap<FaultSegment> {
        areas.iter().map(|&(name, area)| (name, segment(area))).collect()
    }

    fn rakes(values: &[(&str, f64)]) -> FaultMap<f64> {
        values.iter().copied().collect()
    }

    fn relative_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * a.abs().max(b.abs())
    }

    #[test]
    fn test_empty_rupture_rejected() {
        let estimator = MagnitudeEstimator::default();
        let result = estimate_fault_magnitudes(&estimator, &FaultMap::new(), &FaultMap::new());
        assert_eq!(result, Err(AttributionError::EmptyRupture));
    }

    #[test]
    fn test_missing_rake_rejected() {
        let estimator = MagnitudeEstimator::default();
        let result = estimate_fault_magnitudes(&estimator, &faults(&[("F1", 100.0)]), &FaultMap::new());
        assert_eq!(result, Err(AttributionError::MissingRake("F1".to_string())));
    }

    #[test]
    fn test_missing_rake_names_the_fault() {
        let estimator = MagnitudeEstimator::default();
        let result = estimate_fault_magnitudes(
            &estimator,
            &faults(&[("F1", 100.0), ("F2", 50.0)]),
            &rakes(&[("F1", 90.0)]),
        );
        assert_eq!(result, Err(AttributionError::MissingRake("F2".to_string())));
    }

    #[test]
    fn test_single_fault_matches_rupture_magnitude() {
        let estimator = MagnitudeEstimator::default();
        let expected = estimator.magnitude_from_area(100.0, 90.0).unwrap();
        let result =
            estimate_fault_magnitudes(&estimator, &faults(&[("F1", 100.0)]), &rakes(&[("F1", 90.0)]))
                .unwrap();

        assert_eq!(result.len(), 1);
        assert!((result.get("F1").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_equal_area_faults_share_moment() {
        let estimator = MagnitudeEstimator::default();
        let result = estimate_fault_magnitudes(
            &estimator,
            &faults(&[("A", 50.0), ("B", 50.0)]),
            &rakes(&[("A", 0.0), ("B", 0.0)]),
        )
        .unwrap();

        let whole = estimator.magnitude_from_area(100.0, 0.0).unwrap();
        let expected = moment_to_magnitude(0.5 * magnitude_to_moment(whole).unwrap()).unwrap();
        assert_eq!(result.get("A"), result.get("B"));
        assert!((result.get("A").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_average_rake_selects_regime() {
        let estimator = MagnitudeEstimator::default();
        // Mean rake of 90° and 90° is dip-slip; 0° and 0° is strike-slip.
        let dip = estimate_fault_magnitudes(
            &estimator,
            &faults(&[("A", 100.0)]),
            &rakes(&[("A", 90.0)]),
        )
        .unwrap();
        let strike = estimate_fault_magnitudes(
            &estimator,
            &faults(&[("A", 100.0)]),
            &rakes(&[("A", 0.0)]),
        )
        .unwrap();
        assert!((dip.get("A").unwrap() - strike.get("A").unwrap() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_keys_match_fault_order() {
        let estimator = MagnitudeEstimator::default();
        let result = estimate_fault_magnitudes(
            &estimator,
            &faults(&[("Zeta", 30.0), ("Alpha", 70.0)]),
            &rakes(&[("Alpha", 0.0), ("Zeta", 0.0)]),
        )
        .unwrap();
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["Zeta", "Alpha"]);
        assert!(result.get("Alpha").unwrap() > result.get("Zeta").unwrap());
    }

    #[test]
    fn test_moment_conservation_random() {
        let estimator = MagnitudeEstimator::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2016);

        for _ in 0..200 {
            let n = rng.random_range(1..12);
            let names: Vec<String> = (0..n).map(|i| format!("F{}", i)).collect();
            let fault_map: FaultMap<FaultSegment> = names
                .iter()
                .map(|name| (name.clone(), segment(rng.random_range(1.0..2000.0))))
                .collect();
            let rake_map: FaultMap<f64> = names
                .iter()
                .map(|name| (name.clone(), rng.random_range(-180.0..=180.0)))
                .collect();

            let total_area: f64 = fault_map.values().map(|f| f.area_km2).sum();
            let avg_rake = rake_map.values().sum::<f64>() / rake_map.len() as f64;
            let expected = estimator.moment_from_area(total_area, avg_rake).unwrap();

            let magnitudes = estimate_fault_magnitudes(&estimator, &fault_map, &rake_map).unwrap();
            let total = total_moment(&magnitudes).unwrap();
            assert!(relative_eq(total, expected, 1e-6), "{} vs {}", total, expected);
        }
    }

    #[test]
    fn test_aggregate_magnitude_recovers_rupture_magnitude() {
        let estimator = MagnitudeEstimator::default();
        let magnitudes = estimate_fault_magnitudes(
            &estimator,
            &faults(&[("A", 120.0), ("B", 30.0), ("C", 250.0)]),
            &rakes(&[("A", 90.0), ("B", 90.0), ("C", 90.0)]),
        )
        .unwrap();
        let expected = estimator.magnitude_from_area(400.0, 90.0).unwrap();
        assert!((aggregate_magnitude(&magnitudes).unwrap() - expected).abs() < 1e-9);
        assert_eq!(aggregate_magnitude(&FaultMap::new()), Err(AttributionError::EmptyRupture));
    }
}
