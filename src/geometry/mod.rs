//! Fault geometry module.
//!
//! Describes fault segments as planar rings with their surface measures, and
//! the projection seam used to turn catalogue coordinates into map coordinates.

mod segment;
mod projection;

pub use segment::{FaultPlane, FaultSegment, GeometryError, Ring};
pub use projection::{IdentityProjector, NztmToWgs84, Projector, TransverseMercator};
