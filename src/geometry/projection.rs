//! Coordinate projection from the catalogue frame to display coordinates.
//!
//! Catalogue geometry is stored in New Zealand Transverse Mercator (NZTM2000)
//! metres with depth as the third component. Map layers want WGS84
//! longitude/latitude. The [`Projector`] trait is the seam: anything that maps
//! a point to a point can be handed to the rendering layer.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A pure point-to-point coordinate transform.
pub trait Projector {
    /// Projects a single point.
    fn project(&self, point: DVec3) -> DVec3;

    /// Projects every point of a ring, preserving order.
    fn project_ring(&self, ring: &[DVec3]) -> Vec<DVec3> {
        ring.iter().map(|&p| self.project(p)).collect()
    }
}

impl<F> Projector for F
where
    F: Fn(DVec3) -> DVec3,
{
    fn project(&self, point: DVec3) -> DVec3 {
        self(point)
    }
}

/// Leaves coordinates untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityProjector;

impl Projector for IdentityProjector {
    fn project(&self, point: DVec3) -> DVec3 {
        point
    }
}

/// Transverse Mercator projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransverseMercator {
    /// Ellipsoid semi-major axis in metres.
    pub semi_major_axis: f64,
    /// Ellipsoid flattening.
    pub flattening: f64,
    /// Central meridian in degrees.
    pub central_meridian_deg: f64,
    /// Scale factor on the central meridian.
    pub scale_factor: f64,
    /// False easting in metres.
    pub false_easting: f64,
    /// False northing in metres.
    pub false_northing: f64,
}

impl TransverseMercator {
    /// NZGD2000 / New Zealand Transverse Mercator 2000 on the GRS80 ellipsoid.
    pub const fn nztm() -> Self {
        Self {
            semi_major_axis: 6_378_137.0,
            flattening: 1.0 / 298.257_222_101,
            central_meridian_deg: 173.0,
            scale_factor: 0.9996,
            false_easting: 1_600_000.0,
            false_northing: 10_000_000.0,
        }
    }

    fn eccentricity_squared(&self) -> f64 {
        self.flattening * (2.0 - self.flattening)
    }

    /// Meridian arc length from the equator to latitude `phi` (radians).
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.eccentricity_squared();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.semi_major_axis
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }

    /// Converts longitude/latitude in degrees to easting/northing in metres.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let a = self.semi_major_axis;
        let k0 = self.scale_factor;
        let e2 = self.eccentricity_squared();
        let ep2 = e2 / (1.0 - e2);

        let phi = lat_deg.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = a / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let big_a = (lon_deg - self.central_meridian_deg).to_radians() * cos_phi;

        let x = k0
            * n
            * (big_a
                + (1.0 - t + c) * big_a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * big_a.powi(5) / 120.0);
        let y = k0
            * (self.meridian_arc(phi)
                + n * tan_phi
                    * (big_a * big_a / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * big_a.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * big_a.powi(6)
                            / 720.0));

        (self.false_easting + x, self.false_northing + y)
    }

    /// Converts easting/northing in metres to longitude/latitude in degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> (f64, f64) {
        let a = self.semi_major_axis;
        let k0 = self.scale_factor;
        let e2 = self.eccentricity_squared();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = e2 / (1.0 - e2);

        // Footpoint latitude.
        let m = (northing - self.false_northing) / k0;
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();
        let c1 = ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let denom = 1.0 - e2 * sin_phi1 * sin_phi1;
        let n1 = a / denom.sqrt();
        let r1 = a * (1.0 - e2) / denom.powf(1.5);
        let d = (easting - self.false_easting) / (n1 * k0);

        let lat = phi1
            - (n1 * tan_phi1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lon = self.central_meridian_deg.to_radians()
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos_phi1;

        (lon.to_degrees(), lat.to_degrees())
    }
}

/// Projects NZTM `(easting, northing, depth)` to WGS84 `(lon, lat, depth)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NztmToWgs84 {
    tm: TransverseMercator,
}

impl Default for NztmToWgs84 {
    fn default() -> Self {
        Self {
            tm: TransverseMercator::nztm(),
        }
    }
}

impl Projector for NztmToWgs84 {
    fn project(&self, point: DVec3) -> DVec3 {
        let (lon, lat) = self.tm.inverse(point.x, point.y);
        DVec3::new(lon, lat, point.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_central_meridian_has_false_easting() {
        let tm = TransverseMercator::nztm();
        let (e, _) = tm.forward(173.0, -41.0);
        assert!((e - 1_600_000.0).abs() < 1e-6);

        let (e, n) = tm.forward(173.0, 0.0);
        assert!((e - 1_600_000.0).abs() < 1e-6);
        assert!((n - 10_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_wellington_forward() {
        // Wellington CBD; NZTM reference approx E 1748735, N 5427916.
        let (e, n) = TransverseMercator::nztm().forward(174.7762, -41.2865);
        assert!((e - 1_748_735.5).abs() < 5.0, "easting {}", e);
        assert!((n - 5_427_916.5).abs() < 5.0, "northing {}", n);
    }

    #[test]
    fn test_roundtrip_across_new_zealand() {
        let tm = TransverseMercator::nztm();
        for &(lon, lat) in &[
            (174.7762, -41.2865),
            (172.6362, -43.5321),
            (166.5, -46.0),
            (178.5, -37.5),
        ] {
            let (e, n) = tm.forward(lon, lat);
            let (lon2, lat2) = tm.inverse(e, n);
            assert!((lon - lon2).abs() < 1e-5, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-5, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_projector_keeps_depth() {
        let projector = NztmToWgs84::default();
        let (e, n) = TransverseMercator::nztm().forward(172.6362, -43.5321);
        let p = projector.project(DVec3::new(e, n, 12_000.0));
        assert!((p.x - 172.6362).abs() < 1e-5);
        assert!((p.y + 43.5321).abs() < 1e-5);
        assert_eq!(p.z, 12_000.0);
    }

    #[test]
    fn test_closure_and_identity_projectors() {
        let shift = |p: DVec3| p + DVec3::X;
        let ring = [DVec3::ZERO, DVec3::Y];
        assert_eq!(shift.project_ring(&ring), vec![DVec3::X, DVec3::new(1.0, 1.0, 0.0)]);
        assert_eq!(IdentityProjector.project_ring(&ring), ring.to_vec());
    }
}
