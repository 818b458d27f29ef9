//! In-memory rupture catalogue, loadable from JSON.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{CatalogueError, RuptureCatalogue, RuptureFilter};
use crate::geometry::FaultSegment;
use crate::rupture::{FaultInfo, FaultMap, Rupture, RuptureId};

/// One rupture as stored in a catalogue document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueRecord {
    pub id: RuptureId,
    pub magnitude: f64,
    pub rate: f64,
    pub faults: FaultMap<FaultSegment>,
    /// Per-fault metadata for this rupture.
    #[serde(default)]
    pub fault_info: FaultMap<FaultInfo>,
}

/// Serialized form of an [`InMemoryCatalogue`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogueDocument {
    pub ruptures: Vec<CatalogueRecord>,
}

/// A catalogue held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogue {
    ruptures: BTreeMap<RuptureId, Rupture>,
    fault_info: BTreeMap<RuptureId, FaultMap<FaultInfo>>,
}

impl InMemoryCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rupture with its per-fault metadata.
    pub fn insert(&mut self, rupture: Rupture, fault_info: FaultMap<FaultInfo>) -> Result<(), CatalogueError> {
        if self.ruptures.contains_key(&rupture.id) {
            return Err(CatalogueError::DuplicateRupture(rupture.id));
        }
        self.fault_info.insert(rupture.id, fault_info);
        self.ruptures.insert(rupture.id, rupture);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ruptures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ruptures.is_empty()
    }

    pub fn from_document(document: CatalogueDocument) -> Result<Self, CatalogueError> {
        let mut catalogue = Self::new();
        for record in document.ruptures {
            let rupture = Rupture::new(record.id, record.faults, record.magnitude, record.rate);
            catalogue.insert(rupture, record.fault_info)?;
        }
        Ok(catalogue)
    }

    pub fn to_document(&self) -> CatalogueDocument {
        let ruptures = self
            .ruptures
            .values()
            .map(|r| CatalogueRecord {
                id: r.id,
                magnitude: r.magnitude,
                rate: r.rate,
                faults: r.faults.clone(),
                fault_info: self.fault_info.get(&r.id).cloned().unwrap_or_default(),
            })
            .collect();
        CatalogueDocument { ruptures }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogueError> {
        let document: CatalogueDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    /// Loads a catalogue from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogueError> {
        let file = File::open(path)?;
        let catalogue = Self::from_json_reader(BufReader::new(file))?;
        info!(path = %path.display(), ruptures = catalogue.len(), "loaded rupture catalogue");
        Ok(catalogue)
    }

    /// Writes the catalogue as pretty-printed JSON.
    pub fn to_json_file(&self, path: &Path) -> Result<(), CatalogueError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.to_document())?;
        writer.flush()?;
        Ok(())
    }
}

impl RuptureCatalogue for InMemoryCatalogue {
    fn query(&self, filter: &RuptureFilter) -> Result<BTreeMap<RuptureId, Rupture>, CatalogueError> {
        let limit = filter.limit.unwrap_or(usize::MAX);
        let matches: BTreeMap<RuptureId, Rupture> = self
            .ruptures
            .values()
            .filter(|r| filter.matches(r))
            .take(limit)
            .map(|r| (r.id, r.clone()))
            .collect();
        debug!(query = %filter.query, matches = matches.len(), "catalogue query");
        Ok(matches)
    }

    fn get_rupture(&self, id: RuptureId) -> Result<Rupture, CatalogueError> {
        self.ruptures
            .get(&id)
            .cloned()
            .ok_or(CatalogueError::RuptureNotFound(id))
    }

    fn get_rupture_fault_info(&self, id: RuptureId) -> Result<FaultMap<FaultInfo>, CatalogueError> {
        self.fault_info
            .get(&id)
            .cloned()
            .ok_or(CatalogueError::RuptureNotFound(id))
    }

    fn fault_names(&self) -> Result<Vec<String>, CatalogueError> {
        let mut names: Vec<String> = self
            .ruptures
            .values()
            .flat_map(|r| r.fault_names().map(str::to_string))
            .collect();
        names.sort_unstable();
        names.dedup();
        Ok(names)
    }
}
