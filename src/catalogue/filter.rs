//! Rupture query filters.

use serde::{Deserialize, Serialize};

use crate::rupture::Rupture;

/// Inclusive bounds; `None` leaves that side open.
pub type Bounds = (Option<f64>, Option<f64>);

fn within(value: f64, bounds: Bounds) -> bool {
    bounds.0.map_or(true, |lo| value >= lo) && bounds.1.map_or(true, |hi| value <= hi)
}

/// Parameters of a rupture search.
///
/// Rate bounds are linear annual rates. Converting slider exponents to rates
/// is the caller's job (see [`RuptureFilter::with_rate_exponents`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuptureFilter {
    /// Free-text query over fault names.
    pub query: String,
    #[serde(default)]
    pub magnitude_bounds: Bounds,
    #[serde(default)]
    pub rate_bounds: Bounds,
    /// Maximum number of faults a matching rupture may have.
    #[serde(default)]
    pub fault_count_limit: Option<usize>,
    /// Maximum number of ruptures returned.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RuptureFilter {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_magnitude_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.magnitude_bounds = (lower, upper);
        self
    }

    pub fn with_rate_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.rate_bounds = (lower, upper);
        self
    }

    /// Sets rate bounds from base-10 exponents, e.g. `-6` for `1e-6` per year.
    pub fn with_rate_exponents(self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.with_rate_bounds(lower.map(|e| 10f64.powf(e)), upper.map(|e| 10f64.powf(e)))
    }

    pub fn with_fault_count_limit(mut self, limit: Option<usize>) -> Self {
        self.fault_count_limit = limit;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Query terms: whitespace-separated, lower-cased.
    pub fn terms(&self) -> Vec<String> {
        self.query.split_whitespace().map(str::to_lowercase).collect()
    }

    /// Returns true if `rupture` passes the numeric bounds and every query
    /// term appears (case-insensitively) in at least one of its fault names.
    pub fn matches(&self, rupture: &Rupture) -> bool {
        if !within(rupture.magnitude, self.magnitude_bounds) || !within(rupture.rate, self.rate_bounds) {
            return false;
        }
        if self.fault_count_limit.is_some_and(|limit| rupture.fault_count() > limit) {
            return false;
        }

        let names: Vec<String> = rupture.fault_names().map(str::to_lowercase).collect();
        self.terms()
            .iter()
            .all(|term| names.iter().any(|name| name.contains(term.as_str())))
    }
}
