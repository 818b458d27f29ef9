//! Rupture catalogue boundary.
//!
//! The attribution pipeline only needs a source of rupture records. The
//! [`RuptureCatalogue`] trait is that seam; request handlers receive an
//! implementation rather than reaching for a global database handle.

mod filter;
mod memory;

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::rupture::{FaultInfo, FaultMap, Rupture, RuptureId};

pub use filter::{Bounds, RuptureFilter};
pub use memory::{CatalogueDocument, CatalogueRecord, InMemoryCatalogue};

/// Errors that can occur while reading from a catalogue.
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("Rupture {0} not found")]
    RuptureNotFound(RuptureId),
    #[error("Rupture {0} already exists")]
    DuplicateRupture(RuptureId),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A queryable store of rupture records.
pub trait RuptureCatalogue: Send + Sync {
    /// Returns the ruptures matching `filter`, keyed and ordered by id.
    fn query(&self, filter: &RuptureFilter) -> Result<BTreeMap<RuptureId, Rupture>, CatalogueError>;

    /// Fetches a single rupture.
    fn get_rupture(&self, id: RuptureId) -> Result<Rupture, CatalogueError>;

    /// Fetches per-fault metadata for a rupture.
    fn get_rupture_fault_info(&self, id: RuptureId) -> Result<FaultMap<FaultInfo>, CatalogueError>;

    /// Lists every fault name known to the catalogue.
    fn fault_names(&self) -> Result<Vec<String>, CatalogueError>;
}

impl<T: RuptureCatalogue + ?Sized> RuptureCatalogue for Arc<T> {
    fn query(&self, filter: &RuptureFilter) -> Result<BTreeMap<RuptureId, Rupture>, CatalogueError> {
        (**self).query(filter)
    }

    fn get_rupture(&self, id: RuptureId) -> Result<Rupture, CatalogueError> {
        (**self).get_rupture(id)
    }

    fn get_rupture_fault_info(&self, id: RuptureId) -> Result<FaultMap<FaultInfo>, CatalogueError> {
        (**self).get_rupture_fault_info(id)
    }

    fn fault_names(&self) -> Result<Vec<String>, CatalogueError> {
        (**self).fault_names()
    }
}
