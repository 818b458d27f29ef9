//! Earthquake rupture explorer.
//!
//! This crate estimates per-fault magnitudes for multi-fault ruptures using an
//! area-based scaling law, attributes each rupture's annual rate across its
//! faults, and turns the results into map layers and tabular exports.

pub mod geometry;
pub mod scaling;
pub mod rupture;
pub mod attribution;
pub mod render;
pub mod catalogue;
pub mod export;
pub mod explorer;

pub use geometry::{FaultPlane, FaultSegment, NztmToWgs84, Projector};
pub use scaling::{MagnitudeEstimator, ScalingConfig};
pub use rupture::{FaultInfo, FaultMap, Rupture, RuptureId};
pub use attribution::{AttributionCache, RatePolicyKind, RuptureAttribution, RuptureAttributor};
pub use render::{build_layer, RenderableLayer};
pub use catalogue::{InMemoryCatalogue, RuptureCatalogue, RuptureFilter};
pub use explorer::{EmptyGeometryScope, ExplorerConfig, RuptureExplorer};
