//! Configuration for the rupture explorer service.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ExplorerError;
use crate::attribution::RatePolicyKind;
use crate::render::ColorScaleKind;
use crate::scaling::ScalingConfig;

/// Where faults without drawable geometry are excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyGeometryScope {
    /// Only the rendered layer omits them; attribution sees every fault.
    #[default]
    RenderOnly,
    /// They are removed before magnitude and rate attribution as well.
    Attribution,
}

/// Configuration parameters for [`RuptureExplorer`](super::RuptureExplorer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Magnitude-area scaling constants.
    pub scaling: ScalingConfig,
    /// Rate attribution policy.
    pub rate_policy: RatePolicyKind,
    pub empty_geometry: EmptyGeometryScope,
    /// Attribution cache capacity in ruptures (0 disables caching).
    pub cache_capacity: usize,
    /// Maximum number of ruptures a search returns.
    pub query_limit: Option<usize>,
    pub colour_scale: ColorScaleKind,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            scaling: ScalingConfig::default(),
            rate_policy: RatePolicyKind::default(),
            empty_geometry: EmptyGeometryScope::default(),
            cache_capacity: 256,
            query_limit: Some(100),
            colour_scale: ColorScaleKind::default(),
        }
    }
}

impl ExplorerConfig {
    /// Creates a configuration that recomputes every attribution.
    pub fn uncached() -> Self {
        Self {
            cache_capacity: 0,
            ..Default::default()
        }
    }

    /// Creates a configuration that gives each rupture's rate to the faults
    /// whose magnitude-frequency targets best match their estimated magnitude.
    pub fn frequency_matched() -> Self {
        Self {
            rate_policy: RatePolicyKind::FrequencyMatched,
            ..Default::default()
        }
    }

    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ExplorerError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_presets() {
        let config = ExplorerConfig::default();
        assert_eq!(config.rate_policy, RatePolicyKind::EvenPerPlane);
        assert_eq!(config.empty_geometry, EmptyGeometryScope::RenderOnly);
        assert_eq!(config.query_limit, Some(100));
        assert!(config.cache_capacity > 0);

        assert_eq!(ExplorerConfig::uncached().cache_capacity, 0);
        assert_eq!(ExplorerConfig::frequency_matched().rate_policy, RatePolicyKind::FrequencyMatched);
    }

    #[test]
    fn test_partial_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"rate_policy": "frequency_matched", "empty_geometry": "attribution", "query_limit": null}}"#
        )
        .unwrap();

        let config = ExplorerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.rate_policy, RatePolicyKind::FrequencyMatched);
        assert_eq!(config.empty_geometry, EmptyGeometryScope::Attribution);
        assert_eq!(config.query_limit, None);
        assert_eq!(config.cache_capacity, 256);
        assert_eq!(config.scaling, ScalingConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let result = ExplorerConfig::from_json_file(Path::new("/nonexistent/explorer.json"));
        assert!(matches!(result, Err(ExplorerError::Io(_))));
    }
}
