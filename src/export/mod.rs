//! Export module for saving search results and rupture maps to files.
//!
//! Supports CSV tables and plain rupture id lists for search results, and
//! GeoJSON for rendered rupture layers.

mod csv;
mod geojson;

use thiserror::Error;

pub use csv::{export_rupture_list, export_ruptures_csv, write_rupture_list, write_ruptures_csv, CSV_HEADER};
pub use geojson::{export_layer_geojson, layer_to_geojson, write_layer_geojson};

/// Errors that can occur during export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
