//! Log-scale color mapping for fault rates.

use serde::{Deserialize, Serialize};

/// Continuous color ramps available for rate maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScaleKind {
    /// Dark blue through magenta to yellow.
    #[default]
    Plasma,
    /// Dark purple through teal to yellow.
    Viridis,
    /// White to black.
    Greys,
}

const PLASMA: [[u8; 3]; 10] = [
    [13, 8, 135],
    [70, 3, 159],
    [114, 1, 168],
    [156, 23, 158],
    [189, 55, 134],
    [216, 87, 107],
    [237, 121, 83],
    [251, 159, 58],
    [253, 202, 38],
    [240, 249, 33],
];

const VIRIDIS: [[u8; 3]; 10] = [
    [68, 1, 84],
    [72, 40, 120],
    [62, 74, 137],
    [49, 104, 142],
    [38, 130, 142],
    [31, 158, 137],
    [53, 183, 121],
    [110, 206, 88],
    [181, 222, 43],
    [253, 231, 37],
];

const GREYS: [[u8; 3]; 2] = [[255, 255, 255], [0, 0, 0]];

impl ColorScaleKind {
    /// Evenly spaced color stops from low to high.
    pub fn stops(&self) -> &'static [[u8; 3]] {
        match self {
            ColorScaleKind::Plasma => &PLASMA,
            ColorScaleKind::Viridis => &VIRIDIS,
            ColorScaleKind::Greys => &GREYS,
        }
    }

    /// Color at position `t` in [0, 1] (clamped), linearly interpolated
    /// between neighbouring stops.
    pub fn sample(&self, t: f64) -> [u8; 3] {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - lower as f64;

        let a = stops[lower];
        let b = stops[lower + 1];
        let mut rgb = [0u8; 3];
        for i in 0..3 {
            let v = a[i] as f64 + (b[i] as f64 - a[i] as f64) * frac;
            rgb[i] = v.round().clamp(0.0, 255.0) as u8;
        }
        rgb
    }
}

/// Formats an RGB triple as `#rrggbb`.
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Maps rates onto a color ramp on a logarithmic axis.
///
/// The scale is fixed by the full set of rates it is built from. Values at or
/// below zero (and any value under the smallest positive rate) are floored to
/// the smallest positive rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogColorScale {
    kind: ColorScaleKind,
    bounds: Option<(f64, f64)>,
}

impl LogColorScale {
    /// Builds a scale spanning the positive finite values in `rates`.
    pub fn from_rates(rates: &[f64], kind: ColorScaleKind) -> Self {
        let bounds = rates
            .iter()
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
            .fold(None, |acc: Option<(f64, f64)>, r| match acc {
                None => Some((r, r)),
                Some((lo, hi)) => Some((lo.min(r), hi.max(r))),
            });
        Self { kind, bounds }
    }

    /// Smallest positive rate, used as the floor for zero rates.
    pub fn floor(&self) -> Option<f64> {
        self.bounds.map(|(lo, _)| lo)
    }

    /// Largest rate on the scale.
    pub fn ceiling(&self) -> Option<f64> {
        self.bounds.map(|(_, hi)| hi)
    }

    /// Position of `value` on the scale in [0, 1].
    ///
    /// A scale with a single distinct rate places everything at 0.5; a scale
    /// without any positive rate places everything at 0.
    pub fn position(&self, value: f64) -> f64 {
        let Some((lo, hi)) = self.bounds else {
            return 0.0;
        };
        if hi <= lo {
            return 0.5;
        }
        let v = if value.is_finite() { value.max(lo) } else { lo };
        ((v.ln() - lo.ln()) / (hi.ln() - lo.ln())).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> [u8; 3] {
        self.kind.sample(self.position(value))
    }

    pub fn color_hex(&self, value: f64) -> String {
        to_hex(self.color(value))
    }
}
