//! ECEF, geodetic and UTM coordinates.
//!
//! All conversions are pure functions over WGS84, without shared state.
use map_3d::{geodetic2ecef, Ellipsoid};
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::constants::{EARTH_ECCENTRICITY_SQUARED_WGS84, EARTH_SEMI_MAJOR_AXIS_WGS84};

mod utm;

pub use utm::{geodetic_to_utm, utm_to_geodetic};

/// Number of latitude refinement iterations
const GEODETIC_ITERATIONS: usize = 5;

/// WGS84 geodetic coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GeodeticCoordinate {
    /// Latitude in decimal degrees
    pub lat_deg: f64,
    /// Longitude in decimal degrees
    pub lon_deg: f64,
    /// Height above the ellipsoid, in meters
    pub alt_m: f64,
}

impl GeodeticCoordinate {
    pub fn new(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            alt_m,
        }
    }

    /// Converts ECEF coordinates (m) to [GeodeticCoordinate]
    pub fn from_ecef(ecef_m: &Vector3<f64>) -> Self {
        ecef_to_geodetic(ecef_m)
    }

    /// Converts [Self] to ECEF coordinates (m)
    pub fn to_ecef(&self) -> Vector3<f64> {
        geodetic_to_ecef(self)
    }

    /// Projects [Self] to [UtmCoordinate]
    pub fn to_utm(&self) -> UtmCoordinate {
        geodetic_to_utm(self)
    }
}

/// UTM hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Hemisphere {
    #[default]
    North,
    South,
}

impl std::fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::North => write!(f, "N"),
            Self::South => write!(f, "S"),
        }
    }
}

/// Universal Transverse Mercator coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct UtmCoordinate {
    /// Zone number (1..=60)
    pub zone: u8,
    pub hemisphere: Hemisphere,
    #[cfg_attr(feature = "serde", serde(rename = "easting"))]
    pub easting_m: f64,
    #[cfg_attr(feature = "serde", serde(rename = "northing"))]
    pub northing_m: f64,
    /// Longitude of the zone central meridian, in degrees
    #[cfg_attr(feature = "serde", serde(rename = "central_meridian"))]
    pub central_meridian_deg: f64,
}

impl UtmCoordinate {
    /// Converts [Self] back to [GeodeticCoordinate].
    /// UTM does not carry any altitude: it is set to zero.
    pub fn to_geodetic(&self) -> GeodeticCoordinate {
        utm_to_geodetic(self)
    }
}

/// Converts ECEF coordinates (m) to WGS84 [GeodeticCoordinate],
/// using a fixed number of latitude refinements.
pub fn ecef_to_geodetic(ecef_m: &Vector3<f64>) -> GeodeticCoordinate {
    let (x, y, z) = (ecef_m[0], ecef_m[1], ecef_m[2]);
    let a = EARTH_SEMI_MAJOR_AXIS_WGS84;
    let e2 = EARTH_ECCENTRICITY_SQUARED_WGS84;

    let lon = y.atan2(x);
    let p = (x * x + y * y).sqrt();

    // polar axis: cos(lat) vanishes
    if p < 1.0E-9 {
        let b = a * (1.0 - e2).sqrt();
        let lat_deg = if z >= 0.0 { 90.0 } else { -90.0 };
        return GeodeticCoordinate::new(lat_deg, lon.to_degrees(), z.abs() - b);
    }

    let prime_vertical = |lat: f64| a / (1.0 - e2 * lat.sin().powi(2)).sqrt();

    let mut lat = z.atan2(p * (1.0 - e2));

    for _ in 0..GEODETIC_ITERATIONS {
        let n = prime_vertical(lat);
        let h = p / lat.cos() - n;
        lat = z.atan2(p * (1.0 - e2 * n / (n + h)));
    }

    let n = prime_vertical(lat);
    let h = p / lat.cos() - n;

    GeodeticCoordinate::new(lat.to_degrees(), lon.to_degrees(), h)
}

/// Converts WGS84 [GeodeticCoordinate] to ECEF coordinates (m)
pub fn geodetic_to_ecef(geo: &GeodeticCoordinate) -> Vector3<f64> {
    let (x, y, z) = geodetic2ecef(
        geo.lat_deg.to_radians(),
        geo.lon_deg.to_radians(),
        geo.alt_m,
        Ellipsoid::WGS84,
    );
    Vector3::new(x, y, z)
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[test]
    fn ecef_geodetic_reference() {
        // Brussels (ESA ESTEC like) reference
        let geo = GeodeticCoordinate::new(50.8, 4.35, 120.0);
        let ecef = geodetic_to_ecef(&geo);
        let back = ecef_to_geodetic(&ecef);

        assert!((back.lat_deg - geo.lat_deg).abs() < 1.0E-9);
        assert!((back.lon_deg - geo.lon_deg).abs() < 1.0E-9);
        assert!((back.alt_m - geo.alt_m).abs() < 1.0E-4);
    }

    #[test]
    fn ecef_to_geodetic_equator() {
        let ecef = Vector3::new(EARTH_SEMI_MAJOR_AXIS_WGS84, 0.0, 0.0);
        let geo = ecef_to_geodetic(&ecef);
        assert!(geo.lat_deg.abs() < 1.0E-12);
        assert!(geo.lon_deg.abs() < 1.0E-12);
        assert!(geo.alt_m.abs() < 1.0E-6);
    }

    #[test]
    fn ecef_to_geodetic_poles() {
        let b = EARTH_SEMI_MAJOR_AXIS_WGS84 * (1.0 - EARTH_ECCENTRICITY_SQUARED_WGS84).sqrt();

        let north = ecef_to_geodetic(&Vector3::new(0.0, 0.0, b + 10.0));
        assert_eq!(north.lat_deg, 90.0);
        assert!((north.alt_m - 10.0).abs() < 1.0E-6);

        let south = ecef_to_geodetic(&Vector3::new(0.0, 0.0, -b));
        assert_eq!(south.lat_deg, -90.0);
        assert!(south.alt_m.abs() < 1.0E-6);
    }

    #[test]
    fn continental_default_is_in_brazil() {
        let (x, y, z) = crate::constants::CONTINENTAL_DEFAULT_ECEF_M;
        let geo = ecef_to_geodetic(&Vector3::new(x, y, z));
        assert!(geo.lat_deg < -15.0 && geo.lat_deg > -30.0, "{:?}", geo);
        assert!(geo.lon_deg < -45.0 && geo.lon_deg > -55.0, "{:?}", geo);
        assert!(geo.alt_m.abs() < 2000.0, "{:?}", geo);
    }

    #[rstest]
    #[case(4027893.0, 307045.0, 4919475.0)]
    #[case(3752778.0, -4538402.0, -2442731.0)]
    #[case(-4052052.0, 4212836.0, -2545105.0)]
    #[case(1113194.0, -4842853.0, 3985481.0)]
    fn ecef_utm_round_trip(#[case] x: f64, #[case] y: f64, #[case] z: f64) {
        let ecef = Vector3::new(x, y, z);
        let geo = GeodeticCoordinate::from_ecef(&ecef);

        let mut back = geo.to_utm().to_geodetic();
        back.alt_m = geo.alt_m;

        let err_m = (back.to_ecef() - ecef).norm();
        assert!(err_m < 1.0E-3, "({}, {}, {}) err={:.3E}m", x, y, z, err_m);
    }
}
