//! Rendering adapter.
//!
//! Turns attribution results and projected geometry into immutable render
//! descriptors (per-fault features with colors and tooltip values). No
//! drawing or I/O happens here.

mod color;
mod layer;

pub use color::{to_hex, ColorScaleKind, LogColorScale};
pub use layer::{build_layer, format_rate, FaultFeature, LayerBuilder, RenderableLayer};
