//! Request handling: search, per-rupture attribution, maps and exports.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::{EmptyGeometryScope, ExplorerConfig};
use super::ExplorerError;
use crate::attribution::{AttributionCache, RatePolicy, RuptureAttribution, RuptureAttributor};
use crate::catalogue::{RuptureCatalogue, RuptureFilter};
use crate::export::{export_rupture_list, export_ruptures_csv};
use crate::geometry::Projector;
use crate::render::{format_rate, LayerBuilder, RenderableLayer};
use crate::rupture::{Rupture, RuptureId};
use crate::scaling::MagnitudeEstimator;

/// One row of a rupture search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuptureSummary {
    pub id: RuptureId,
    /// Catalogue magnitude.
    pub magnitude: f64,
    /// Area-only magnitude estimate at zero rake, if the area allows one.
    pub estimated_magnitude: Option<f64>,
    pub rate: f64,
    pub area_km2: f64,
    pub length_km: f64,
    pub fault_count: usize,
    /// e.g. `"Alpine + 3 others"`.
    pub faults: String,
}

impl RuptureSummary {
    fn from_rupture(rupture: &Rupture, estimator: &MagnitudeEstimator) -> Self {
        let estimated_magnitude = match estimator.magnitude_from_area(rupture.area_km2(), 0.0) {
            Ok(m) => Some(m),
            Err(err) => {
                warn!(rupture_id = rupture.id, %err, "no area-based magnitude estimate");
                None
            }
        };
        Self {
            id: rupture.id,
            magnitude: rupture.magnitude,
            estimated_magnitude,
            rate: rupture.rate,
            area_km2: rupture.area_km2(),
            length_km: rupture.length_km(),
            fault_count: rupture.fault_count(),
            faults: rupture.fault_summary(),
        }
    }
}

/// Display values for a single rupture's summary panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RupturePanel {
    pub id: RuptureId,
    /// Annual rate, e.g. `"2.5e-04"`.
    pub rate: String,
    /// Magnitude to one decimal place.
    pub magnitude: String,
    /// Area in whole km².
    pub area_km2: i64,
    /// Length in whole km.
    pub length_km: i64,
    pub fault_count: usize,
}

impl RupturePanel {
    pub fn from_rupture(rupture: &Rupture) -> Self {
        Self {
            id: rupture.id,
            rate: format_rate(rupture.rate),
            magnitude: format!("{:.1}", rupture.magnitude),
            area_km2: rupture.area_km2().round() as i64,
            length_km: rupture.length_km().round() as i64,
            fault_count: rupture.fault_count(),
        }
    }
}

/// Serves rupture queries against an injected catalogue.
///
/// Attributions are computed on demand and kept in a bounded cache keyed by
/// rupture id. The explorer itself holds no other mutable state, so it can be
/// shared across threads when the catalogue can.
pub struct RuptureExplorer<C> {
    catalogue: C,
    attributor: RuptureAttributor,
    cache: AttributionCache,
    layers: LayerBuilder,
    config: ExplorerConfig,
}

impl<C: RuptureCatalogue> RuptureExplorer<C> {
    pub fn new(catalogue: C, config: ExplorerConfig) -> Self {
        Self {
            catalogue,
            attributor: RuptureAttributor::new(config.scaling, config.rate_policy),
            cache: AttributionCache::new(config.cache_capacity),
            layers: LayerBuilder::new(config.colour_scale),
            config,
        }
    }

    pub fn catalogue(&self) -> &C {
        &self.catalogue
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn attributor(&self) -> &RuptureAttributor {
        &self.attributor
    }

    pub fn cache(&self) -> &AttributionCache {
        &self.cache
    }

    /// Searches the catalogue, capping results at the configured query limit.
    ///
    /// # Returns
    /// One summary per matching rupture, in rupture id order
    pub fn search(&self, filter: &RuptureFilter) -> Result<Vec<RuptureSummary>, ExplorerError> {
        let ruptures = self.query(filter)?;
        let estimator = self.attributor.estimator();
        let summaries: Vec<RuptureSummary> = ruptures
            .par_iter()
            .map(|rupture| RuptureSummary::from_rupture(rupture, estimator))
            .collect();
        info!(query = %filter.query, results = summaries.len(), "rupture search");
        Ok(summaries)
    }

    /// Magnitude and rate attribution for one rupture, served from the cache
    /// when possible.
    pub fn attribution(&self, id: RuptureId) -> Result<Arc<RuptureAttribution>, ExplorerError> {
        self.cache.get_or_try_insert(id, || -> Result<RuptureAttribution, ExplorerError> {
            let rupture = self.attribution_scope(self.catalogue.get_rupture(id)?);
            let fault_info = self.catalogue.get_rupture_fault_info(id)?;
            let attribution = self.attributor.attribute(&rupture, &fault_info)?;
            debug!(
                rupture_id = id,
                faults = attribution.magnitudes.len(),
                policy = self.attributor.policy().name(),
                "attributed rupture"
            );
            Ok(attribution)
        })
    }

    /// Builds the map layer for one rupture.
    ///
    /// # Arguments
    /// * `id` - Rupture to draw
    /// * `projector` - Transform from catalogue coordinates to map coordinates
    pub fn rupture_map(&self, id: RuptureId, projector: &dyn Projector) -> Result<RenderableLayer, ExplorerError> {
        let rupture = self.catalogue.get_rupture(id)?;
        let attribution = self.attribution(id)?;
        Ok(self
            .layers
            .build(&rupture, &attribution.magnitudes, &attribution.rates, projector))
    }

    /// Summary panel values for one rupture.
    pub fn panel(&self, id: RuptureId) -> Result<RupturePanel, ExplorerError> {
        Ok(RupturePanel::from_rupture(&self.catalogue.get_rupture(id)?))
    }

    pub fn fault_names(&self) -> Result<Vec<String>, ExplorerError> {
        Ok(self.catalogue.fault_names()?)
    }

    /// Writes the search results to a CSV file.
    pub fn export_csv(&self, filter: &RuptureFilter, path: &Path) -> Result<usize, ExplorerError> {
        let ruptures = self.query(filter)?;
        export_ruptures_csv(&ruptures, path)?;
        info!(path = %path.display(), rows = ruptures.len(), "exported rupture table");
        Ok(ruptures.len())
    }

    /// Writes the ids of the search results, one per line.
    pub fn export_ids(&self, filter: &RuptureFilter, path: &Path) -> Result<usize, ExplorerError> {
        let ruptures = self.query(filter)?;
        export_rupture_list(ruptures.iter().map(|r| r.id), path)?;
        info!(path = %path.display(), rows = ruptures.len(), "exported rupture list");
        Ok(ruptures.len())
    }

    fn query(&self, filter: &RuptureFilter) -> Result<Vec<Rupture>, ExplorerError> {
        let limit = match (filter.limit, self.config.query_limit) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let filter = filter.clone().with_limit(limit);
        Ok(self.catalogue.query(&filter)?.into_values().collect())
    }

    fn attribution_scope(&self, mut rupture: Rupture) -> Rupture {
        if self.config.empty_geometry == EmptyGeometryScope::Attribution {
            let before = rupture.fault_count();
            rupture.faults.retain(|_, fault| !fault.is_empty());
            if rupture.fault_count() < before {
                debug!(
                    rupture_id = rupture.id,
                    dropped = before - rupture.fault_count(),
                    "excluding faults without geometry from attribution"
                );
            }
        }
        rupture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::{AttributionError, RatePolicyKind};
    use crate::catalogue::{CatalogueError, InMemoryCatalogue};
    use crate::geometry::{FaultSegment, IdentityProjector, Ring};
    use crate::rupture::{FaultInfo, FaultMap};
    use glam::DVec3;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Counts rupture lookups on top of an in-memory catalogue.
    struct CountingCatalogue {
        inner: InMemoryCatalogue,
        lookups: AtomicUsize,
    }

    impl RuptureCatalogue for CountingCatalogue {
        fn query(&self, filter: &RuptureFilter) -> Result<BTreeMap<RuptureId, Rupture>, CatalogueError> {
            self.inner.query(filter)
        }

        fn get_rupture(&self, id: RuptureId) -> Result<Rupture, CatalogueError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get_rupture(id)
        }

        fn get_rupture_fault_info(&self, id: RuptureId) -> Result<FaultMap<FaultInfo>, CatalogueError> {
            self.inner.get_rupture_fault_info(id)
        }

        fn fault_names(&self) -> Result<Vec<String>, CatalogueError> {
            self.inner.fault_names()
        }
    }

    fn ring(x: f64) -> Ring {
        vec![
            DVec3::new(x, 0.0, 0.0),
            DVec3::new(x + 1000.0, 0.0, 0.0),
            DVec3::new(x + 1000.0, 0.0, 1000.0),
        ]
    }

    fn segment(area: f64, planes: usize, drawable: bool) -> FaultSegment {
        let geometry = if drawable { (0..planes).map(|i| ring(i as f64 * 1000.0)).collect() } else { vec![] };
        FaultSegment::new(geometry, area, area / 10.0, 10.0, planes, 90.0).unwrap()
    }

    fn catalogue() -> InMemoryCatalogue {
        let mut catalogue = InMemoryCatalogue::new();

        let faults: FaultMap<FaultSegment> =
            [("Wairau", segment(100.0, 2, true)), ("Awatere", segment(50.0, 1, true))].into_iter().collect();
        let info: FaultMap<FaultInfo> =
            [("Wairau", FaultInfo::with_rake(90.0)), ("Awatere", FaultInfo::with_rake(90.0))].into_iter().collect();
        catalogue.insert(Rupture::new(1, faults, 7.1, 3e-4), info).unwrap();

        let faults: FaultMap<FaultSegment> =
            [("Hope", segment(100.0, 1, true)), ("Offshore", segment(100.0, 1, false))].into_iter().collect();
        let info: FaultMap<FaultInfo> =
            [("Hope", FaultInfo::with_rake(0.0)), ("Offshore", FaultInfo::with_rake(0.0))].into_iter().collect();
        catalogue.insert(Rupture::new(2, faults, 6.9, 1e-4), info).unwrap();

        let faults: FaultMap<FaultSegment> = [("Alpine", segment(400.0, 4, true))].into_iter().collect();
        catalogue.insert(Rupture::new(3, faults, 7.6, 0.0), FaultMap::new()).unwrap();

        catalogue
    }

    fn counting() -> CountingCatalogue {
        CountingCatalogue {
            inner: catalogue(),
            lookups: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_search_summaries() {
        let explorer = RuptureExplorer::new(catalogue(), ExplorerConfig::default());
        let results = explorer.search(&RuptureFilter::new("")).unwrap();
        assert_eq!(results.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let first = &results[0];
        assert_eq!(first.fault_count, 2);
        assert_eq!(first.faults, "Awatere + 1 others");
        assert!((first.area_km2 - 150.0).abs() < 1e-9);
        let expected = explorer.attributor().estimator().magnitude_from_area(150.0, 0.0).unwrap();
        assert_eq!(first.estimated_magnitude, Some(expected));
        assert_eq!(first.magnitude, 7.1);
    }

    #[test]
    fn test_search_respects_query_limit() {
        let config = ExplorerConfig {
            query_limit: Some(2),
            ..Default::default()
        };
        let explorer = RuptureExplorer::new(catalogue(), config);
        assert_eq!(explorer.search(&RuptureFilter::new("")).unwrap().len(), 2);
        assert_eq!(explorer.search(&RuptureFilter::new("").with_limit(Some(1))).unwrap().len(), 1);
        assert_eq!(explorer.search(&RuptureFilter::new("hope")).unwrap()[0].id, 2);
    }

    #[test]
    fn test_rupture_map_display_rates() {
        let explorer = RuptureExplorer::new(catalogue(), ExplorerConfig::default());
        let layer = explorer.rupture_map(1, &IdentityProjector).unwrap();
        let r = 3e-4;

        let wairau = layer.feature("Wairau").unwrap();
        let awatere = layer.feature("Awatere").unwrap();
        assert!((wairau.display_rate - (r * 2.0 / 3.0) / 2.0).abs() < 1e-18);
        assert!((awatere.display_rate - r / 3.0).abs() < 1e-18);
        assert_eq!(wairau.rings.len(), 2);
    }

    #[test]
    fn test_attribution_is_cached() {
        let explorer = RuptureExplorer::new(counting(), ExplorerConfig::default());
        let first = explorer.attribution(1).unwrap();
        let second = explorer.attribution(1).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(explorer.catalogue().lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_can_be_disabled() {
        let explorer = RuptureExplorer::new(counting(), ExplorerConfig::uncached());
        let first = explorer.attribution(1).unwrap();
        let second = explorer.attribution(1).unwrap();
        assert_eq!(first, second);
        assert_eq!(explorer.catalogue().lookups.load(Ordering::SeqCst), 2);
        assert!(!explorer.cache().is_enabled());
    }

    #[test]
    fn test_empty_geometry_scope() {
        let render_only = RuptureExplorer::new(catalogue(), ExplorerConfig::default());
        let attribution = render_only.attribution(2).unwrap();
        assert_eq!(attribution.magnitudes.len(), 2);
        let layer = render_only.rupture_map(2, &IdentityProjector).unwrap();
        assert_eq!(layer.dropped, vec!["Offshore".to_string()]);
        assert!((layer.feature("Hope").unwrap().display_rate - 0.5e-4).abs() < 1e-18);

        let config = ExplorerConfig {
            empty_geometry: EmptyGeometryScope::Attribution,
            ..Default::default()
        };
        let scoped = RuptureExplorer::new(catalogue(), config);
        let attribution = scoped.attribution(2).unwrap();
        assert_eq!(attribution.magnitudes.keys().collect::<Vec<_>>(), vec!["Hope"]);
        let layer = scoped.rupture_map(2, &IdentityProjector).unwrap();
        assert!((layer.feature("Hope").unwrap().display_rate - 1e-4).abs() < 1e-18);

        // Only Hope carries moment, so it takes the whole area estimate.
        let whole = scoped.attributor().estimator().magnitude_from_area(100.0, 0.0).unwrap();
        assert!((attribution.magnitudes.get("Hope").unwrap() - whole).abs() < 1e-9);
    }

    #[test]
    fn test_errors_propagate() {
        let explorer = RuptureExplorer::new(catalogue(), ExplorerConfig::default());
        assert!(matches!(
            explorer.attribution(42),
            Err(ExplorerError::Catalogue(CatalogueError::RuptureNotFound(42)))
        ));
        assert!(matches!(
            explorer.attribution(3),
            Err(ExplorerError::Attribution(AttributionError::MissingRake(ref name))) if name == "Alpine"
        ));
        // Failures are not cached.
        assert!(explorer.cache().is_empty());
    }

    #[test]
    fn test_policy_from_config() {
        let explorer = RuptureExplorer::new(catalogue(), ExplorerConfig::frequency_matched());
        let attribution = explorer.attribution(1).unwrap();
        assert_eq!(attribution.policy, RatePolicyKind::FrequencyMatched);
        // No magnitude-frequency targets, so no fault is preferred.
        assert!(attribution.rates.values().all(|&r| r == 0.0));
    }

    #[test]
    fn test_panel_values() {
        let explorer = RuptureExplorer::new(catalogue(), ExplorerConfig::default());
        let panel = explorer.panel(1).unwrap();
        assert_eq!(panel.rate, "3.0e-04");
        assert_eq!(panel.magnitude, "7.1");
        assert_eq!(panel.area_km2, 150);
        assert_eq!(panel.length_km, 15);
        assert_eq!(panel.fault_count, 2);
    }

    #[test]
    fn test_exports() {
        let dir = tempdir().unwrap();
        let explorer = RuptureExplorer::new(catalogue(), ExplorerConfig::default());
        let csv_path = dir.path().join("ruptures.csv");
        let ids_path = dir.path().join("ruptures.txt");

        assert_eq!(explorer.export_csv(&RuptureFilter::new("hope"), &csv_path).unwrap(), 1);
        assert_eq!(explorer.export_ids(&RuptureFilter::new(""), &ids_path).unwrap(), 3);

        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(csv.lines().nth(1), Some("2,6.9,200,20,0.0001"));
        assert_eq!(std::fs::read_to_string(&ids_path).unwrap(), "1\n2\n3\n");
    }

    #[test]
    fn test_concurrent_requests_converge() {
        let explorer = RuptureExplorer::new(catalogue(), ExplorerConfig::default());
        let results: Vec<Arc<RuptureAttribution>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| explorer.attribution(1).unwrap())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }
}
