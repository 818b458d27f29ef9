//! GeoJSON export of a rendered rupture layer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::ExportError;
use crate::geometry::Ring;
use crate::render::{FaultFeature, RenderableLayer};

/// Closed GeoJSON linear ring from a projected ring (x, y only).
fn ring_coordinates(ring: &Ring) -> Vec<[f64; 2]> {
    let mut coords: Vec<[f64; 2]> = ring.iter().map(|p| [p.x, p.y]).collect();
    if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
        if first != last {
            coords.push(first);
        }
    }
    coords
}

fn feature_json(feature: &FaultFeature) -> Value {
    let polygons: Vec<Vec<Vec<[f64; 2]>>> = feature.rings.iter().map(|ring| vec![ring_coordinates(ring)]).collect();
    json!({
        "type": "Feature",
        "geometry": {
            "type": "MultiPolygon",
            "coordinates": polygons,
        },
        "properties": {
            "name": feature.name,
            "magnitude": feature.magnitude,
            "length_km": feature.length_km,
            "width_km": feature.width_km,
            "segments": feature.segments,
            "rate": feature.display_rate,
            "rate_label": feature.rate_label,
            "fill": feature.color,
            "tooltip": feature.tooltip(),
        },
    })
}

/// Converts a layer into a GeoJSON `FeatureCollection`.
pub fn layer_to_geojson(layer: &RenderableLayer) -> Value {
    json!({
        "type": "FeatureCollection",
        "rupture_id": layer.rupture_id,
        "features": layer.features.iter().map(feature_json).collect::<Vec<_>>(),
    })
}

/// Writes a layer as pretty-printed GeoJSON.
pub fn write_layer_geojson<W: Write>(layer: &RenderableLayer, mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, &layer_to_geojson(layer))?;
    writer.flush()?;
    Ok(())
}

/// Exports a layer to a GeoJSON file.
pub fn export_layer_geojson(layer: &RenderableLayer, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_layer_geojson(layer, BufWriter::new(file))
}
