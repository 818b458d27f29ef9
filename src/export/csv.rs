//! Tabular exports of rupture search results.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::ExportError;
use crate::rupture::{Rupture, RuptureId};

/// Header row of the rupture CSV export.
pub const CSV_HEADER: &str = "Rupture ID,Magnitude,Area,Length,Rate";

/// Writes one CSV row per rupture, using the catalogue's aggregate fields.
///
/// # Arguments
/// * `ruptures` - Ruptures in the order the rows should appear
/// * `writer` - Destination
pub fn write_ruptures_csv<'a, W: Write>(
    ruptures: impl IntoIterator<Item = &'a Rupture>,
    mut writer: W,
) -> Result<(), ExportError> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for rupture in ruptures {
        writeln!(
            writer,
            "{},{},{},{},{}",
            rupture.id,
            rupture.magnitude,
            rupture.area_km2(),
            rupture.length_km(),
            rupture.rate
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Exports ruptures to a CSV file.
///
/// # Returns
/// `Ok(())` on success, or an error if the file cannot be written
pub fn export_ruptures_csv<'a>(
    ruptures: impl IntoIterator<Item = &'a Rupture>,
    path: &Path,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_ruptures_csv(ruptures, BufWriter::new(file))
}

/// Writes rupture ids, one per line.
pub fn write_rupture_list<W: Write>(
    ids: impl IntoIterator<Item = RuptureId>,
    mut writer: W,
) -> Result<(), ExportError> {
    for id in ids {
        writeln!(writer, "{}", id)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_rupture_list(ids: impl IntoIterator<Item = RuptureId>, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_rupture_list(ids, BufWriter::new(file))
}
