//! Render descriptors for a rupture's faults.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::color::{ColorScaleKind, LogColorScale};
use crate::attribution::{MagnitudeAttribution, RateAttribution};
use crate::geometry::{Projector, Ring};
use crate::rupture::{Rupture, RuptureId};

/// Formats a rate in scientific notation with two significant digits,
/// e.g. `2.5e-04`.
pub fn format_rate(rate: f64) -> String {
    let formatted = format!("{:.1e}", rate);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exp.abs())
            }
            Err(_) => formatted,
        },
        None => formatted,
    }
}

/// One fault's drawable feature with its tooltip values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultFeature {
    pub name: String,
    /// Projected boundary rings.
    pub rings: Vec<Ring>,
    /// Estimated magnitude, if the fault took part in magnitude attribution.
    pub magnitude: Option<f64>,
    /// Length in whole km.
    pub length_km: i64,
    /// Width in whole km.
    pub width_km: i64,
    /// Number of planes (segments).
    pub segments: usize,
    /// Attributed rate divided by plane count.
    pub display_rate: f64,
    /// `display_rate` formatted for display.
    pub rate_label: String,
    /// Fill color as `#rrggbb`.
    pub color: String,
}

impl FaultFeature {
    /// Multi-line hover text.
    pub fn tooltip(&self) -> String {
        let mut lines = vec![self.name.clone()];
        if let Some(m) = self.magnitude {
            lines.push(format!("Magnitude: {:.1}", m));
        }
        lines.push(format!("Width (km): {}", self.width_km));
        lines.push(format!("Length (km): {}", self.length_km));
        lines.push(format!("Segments: {}", self.segments));
        lines.push(format!("Mean Segment Rupture Rate: {}", self.rate_label));
        lines.join("\n")
    }
}

/// Immutable render descriptor for one rupture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderableLayer {
    pub rupture_id: RuptureId,
    /// Features for faults with drawable geometry, in catalogue order.
    pub features: Vec<FaultFeature>,
    /// Names of faults left out because their geometry is empty.
    pub dropped: Vec<String>,
    /// Color scale floor (smallest positive display rate).
    pub min_rate: Option<f64>,
    /// Color scale ceiling (largest display rate).
    pub max_rate: Option<f64>,
}

impl RenderableLayer {
    pub fn feature(&self, name: &str) -> Option<&FaultFeature> {
        self.features.iter().find(|f| f.name == name)
    }
}

/// Builds render descriptors from attribution results.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayerBuilder {
    pub color_scale: ColorScaleKind,
}

impl LayerBuilder {
    pub fn new(color_scale: ColorScaleKind) -> Self {
        Self { color_scale }
    }

    /// Builds the layer for `rupture`.
    ///
    /// Faults with empty geometry are dropped. Each remaining fault's display
    /// rate is its attributed rate (zero when absent) divided by its plane
    /// count, and its color comes from a log scale over all display rates.
    ///
    /// # Arguments
    /// * `rupture` - The rupture to draw
    /// * `magnitudes` - Per-fault magnitude estimates
    /// * `rates` - Per-fault attributed rates
    /// * `projector` - Transform from catalogue to map coordinates
    pub fn build(
        &self,
        rupture: &Rupture,
        magnitudes: &MagnitudeAttribution,
        rates: &RateAttribution,
        projector: &dyn Projector,
    ) -> RenderableLayer {
        let mut dropped = Vec::new();
        let mut retained = Vec::new();
        for (name, fault) in rupture.faults.iter() {
            if fault.is_empty() {
                dropped.push(name.to_string());
            } else {
                let display_rate = rates.get(name).copied().unwrap_or(0.0) / fault.plane_divisor() as f64;
                retained.push((name, fault, display_rate));
            }
        }
        if !dropped.is_empty() {
            debug!(rupture_id = rupture.id, dropped = dropped.len(), "dropping faults without geometry");
        }

        let display_rates: Vec<f64> = retained.iter().map(|&(_, _, r)| r).collect();
        let scale = LogColorScale::from_rates(&display_rates, self.color_scale);

        let features = retained
            .into_iter()
            .map(|(name, fault, display_rate)| FaultFeature {
                name: name.to_string(),
                rings: fault
                    .geometry
                    .iter()
                    .filter(|ring| !ring.is_empty())
                    .map(|ring| projector.project_ring(ring))
                    .collect(),
                magnitude: magnitudes.get(name).copied(),
                length_km: fault.length_km.round() as i64,
                width_km: fault.width_km.round() as i64,
                segments: fault.plane_count,
                display_rate,
                rate_label: format_rate(display_rate),
                color: scale.color_hex(display_rate),
            })
            .collect();

        RenderableLayer {
            rupture_id: rupture.id,
            features,
            dropped,
            min_rate: scale.floor(),
            max_rate: scale.ceiling(),
        }
    }
}

/// Builds a layer with the default color scale.
pub fn build_layer(
    rupture: &Rupture,
    magnitudes: &MagnitudeAttribution,
    rates: &RateAttribution,
    projector: &dyn Projector,
) -> RenderableLayer {
    LayerBuilder::default().build(rupture, magnitudes, rates, projector)
}
