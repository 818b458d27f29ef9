//! Fault segment geometry: planar rings, area, length, width and plane count.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A closed boundary ring in the projected reference frame.
///
/// Points are `(easting, northing, depth)` in metres for catalogue data; the
/// ring is implicitly closed (the last point joins the first).
pub type Ring = Vec<DVec3>;

/// Errors raised when a fault segment's measurements are degenerate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Fault {quantity} must be positive and finite, got {value}")]
    NonPositiveMeasure { quantity: &'static str, value: f64 },
    #[error("Rake must lie in [-180, 180] degrees, got {0}")]
    RakeOutOfRange(f64),
}

/// A rectangular sub-plane of a fault segment.
///
/// Corners are ordered top-left, top-right, bottom-right, bottom-left when
/// viewed along strike. Coordinates are metres (easting, northing, depth).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultPlane {
    pub corners: [DVec3; 4],
}

impl FaultPlane {
    pub fn new(corners: [DVec3; 4]) -> Self {
        Self { corners }
    }

    /// Along-strike length of the plane in km (top edge).
    pub fn length_km(&self) -> f64 {
        self.corners[0].distance(self.corners[1]) / 1000.0
    }

    /// Down-dip width of the plane in km (left edge).
    pub fn width_km(&self) -> f64 {
        self.corners[0].distance(self.corners[3]) / 1000.0
    }

    /// Plane area in km².
    pub fn area_km2(&self) -> f64 {
        self.length_km() * self.width_km()
    }

    /// The plane outline as a ring.
    pub fn ring(&self) -> Ring {
        self.corners.to_vec()
    }
}

/// A named portion of a fault surface taking part in a rupture.
///
/// The segment's name is the key it is stored under in a rupture, so it is
/// not repeated here.
///
/// Deserialisation goes through [`FaultSegment::new`], so catalogue records
/// with degenerate measurements are rejected on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FaultSegmentRecord")]
pub struct FaultSegment {
    /// Boundary rings in the projected reference frame, one per plane.
    pub geometry: Vec<Ring>,
    /// Surface area in km².
    pub area_km2: f64,
    /// Along-strike length in km.
    pub length_km: f64,
    /// Down-dip width in km.
    pub width_km: f64,
    /// Number of rectangular sub-planes composing the segment.
    pub plane_count: usize,
    /// Rake embedded in the segment's geometry record, in degrees.
    pub rake: f64,
}

/// Unvalidated on-disk form of a [`FaultSegment`].
#[derive(Deserialize)]
struct FaultSegmentRecord {
    #[serde(default)]
    geometry: Vec<Ring>,
    area_km2: f64,
    length_km: f64,
    width_km: f64,
    plane_count: usize,
    #[serde(default)]
    rake: f64,
}

impl TryFrom<FaultSegmentRecord> for FaultSegment {
    type Error = GeometryError;

    fn try_from(record: FaultSegmentRecord) -> Result<Self, Self::Error> {
        FaultSegment::new(
            record.geometry,
            record.area_km2,
            record.length_km,
            record.width_km,
            record.plane_count,
            record.rake,
        )
    }
}

impl FaultSegment {
    /// Creates a segment from catalogue measurements, rejecting degenerate values.
    pub fn new(
        geometry: Vec<Ring>,
        area_km2: f64,
        length_km: f64,
        width_km: f64,
        plane_count: usize,
        rake: f64,
    ) -> Result<Self, GeometryError> {
        for (quantity, value) in [("area", area_km2), ("length", length_km), ("width", width_km)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GeometryError::NonPositiveMeasure { quantity, value });
            }
        }
        if !(-180.0..=180.0).contains(&rake) {
            return Err(GeometryError::RakeOutOfRange(rake));
        }

        Ok(Self {
            geometry,
            area_km2,
            length_km,
            width_km,
            plane_count,
            rake,
        })
    }

    /// Builds a segment from its rectangular planes.
    ///
    /// Area and length accumulate over planes; width is taken from the first
    /// plane. Each plane contributes one ring to the geometry.
    pub fn from_planes(planes: &[FaultPlane], rake: f64) -> Result<Self, GeometryError> {
        let area_km2 = planes.iter().map(FaultPlane::area_km2).sum();
        let length_km = planes.iter().map(FaultPlane::length_km).sum();
        let width_km = planes.first().map(FaultPlane::width_km).unwrap_or(0.0);
        let geometry = planes.iter().map(FaultPlane::ring).collect();

        Self::new(geometry, area_km2, length_km, width_km, planes.len(), rake)
    }

    /// Returns true if the segment has no drawable geometry.
    pub fn is_empty(&self) -> bool {
        self.geometry.iter().all(|ring| ring.is_empty())
    }

    /// Returns the number of planes, treating zero as one for per-plane averages.
    pub fn plane_divisor(&self) -> usize {
        self.plane_count.max(1)
    }
}
