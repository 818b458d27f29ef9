//! Rupture explorer service.
//!
//! Ties a catalogue to the attribution, rendering and export layers. The
//! catalogue is injected, so tests and alternative stores plug in without a
//! process-wide handle.

mod config;
mod service;

use thiserror::Error;

use crate::attribution::AttributionError;
use crate::catalogue::CatalogueError;
use crate::export::ExportError;
use crate::scaling::ScalingError;

pub use config::{EmptyGeometryScope, ExplorerConfig};
pub use service::{RuptureExplorer, RupturePanel, RuptureSummary};

/// Errors surfaced by explorer requests.
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),
    #[error("Attribution failed: {0}")]
    Attribution(#[from] AttributionError),
    #[error("Scaling error: {0}")]
    Scaling(#[from] ScalingError),
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
