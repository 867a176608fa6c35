//! Transverse Mercator projection, Krüger series to sixth order in `n`.
use crate::{
    constants::{
        EARTH_ECCENTRICITY_SQUARED_WGS84, EARTH_FLATTENING_WGS84, EARTH_SEMI_MAJOR_AXIS_WGS84,
        UTM_FALSE_EASTING_M, UTM_FALSE_NORTHING_SOUTH_M, UTM_SCALE_FACTOR,
    },
    coords::{GeodeticCoordinate, Hemisphere, UtmCoordinate},
};

/// Max. Newton iterations, conformal to geodetic latitude
const MAX_LATITUDE_ITERATIONS: usize = 10;

/// Series orders
const ORDER: usize = 6;

/// Third flattening
fn third_flattening() -> f64 {
    EARTH_FLATTENING_WGS84 / (2.0 - EARTH_FLATTENING_WGS84)
}

/// Rectifying radius
fn rectifying_radius(n: f64) -> f64 {
    let n2 = n * n;
    EARTH_SEMI_MAJOR_AXIS_WGS84 / (1.0 + n)
        * (1.0 + n2 / 4.0 + n2 * n2 / 64.0 + n2 * n2 * n2 / 256.0)
}

/// Forward series coefficients
fn alpha(n: f64) -> [f64; ORDER] {
    let (n2, n3, n4, n5, n6) = (n.powi(2), n.powi(3), n.powi(4), n.powi(5), n.powi(6));
    [
        n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
            + 7891.0 * n6 / 37800.0,
        13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
            - 1983433.0 * n6 / 1935360.0,
        61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
            + 167603.0 * n6 / 181440.0,
        49561.0 * n4 / 161280.0 - 179.0 * n5 / 168.0 + 6601661.0 * n6 / 7257600.0,
        34729.0 * n5 / 80640.0 - 3418889.0 * n6 / 1995840.0,
        212378941.0 * n6 / 319334400.0,
    ]
}

/// Inverse series coefficients
fn beta(n: f64) -> [f64; ORDER] {
    let (n2, n3, n4, n5, n6) = (n.powi(2), n.powi(3), n.powi(4), n.powi(5), n.powi(6));
    [
        n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
            + 96199.0 * n6 / 604800.0,
        n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
            - 1118711.0 * n6 / 3870720.0,
        17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
        4397.0 * n4 / 161280.0 - 11.0 * n5 / 504.0 - 830251.0 * n6 / 7257600.0,
        4583.0 * n5 / 161280.0 - 108847.0 * n6 / 3991680.0,
        20648693.0 * n6 / 638668800.0,
    ]
}

/// UTM zone of given longitude (ddeg)
pub(crate) fn zone(lon_deg: f64) -> u8 {
    let zone = ((lon_deg + 180.0) / 6.0).floor() as i32 + 1;
    zone.clamp(1, 60) as u8
}

/// Central meridian (ddeg) of given zone
pub(crate) fn central_meridian_deg(zone: u8) -> f64 {
    f64::from(zone) * 6.0 - 183.0
}

/// Projects [GeodeticCoordinate] onto its [UtmCoordinate] zone.
/// Northing gains a false 10 000 km offset in the southern hemisphere.
pub fn geodetic_to_utm(geo: &GeodeticCoordinate) -> UtmCoordinate {
    let e = EARTH_ECCENTRICITY_SQUARED_WGS84.sqrt();
    let n = third_flattening();
    let k0_a = UTM_SCALE_FACTOR * rectifying_radius(n);
    let alpha = alpha(n);

    let zone = zone(geo.lon_deg);
    let central_meridian_deg = central_meridian_deg(zone);

    let phi = geo.lat_deg.to_radians();
    let lambda = (geo.lon_deg - central_meridian_deg).to_radians();

    let t = ((phi.sin()).atanh() - e * (e * phi.sin()).atanh()).sinh();
    let xi_p = t.atan2(lambda.cos());
    let eta_p = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

    let (mut xi, mut eta) = (xi_p, eta_p);
    for (j, alpha_j) in alpha.iter().enumerate() {
        let k = 2.0 * (j + 1) as f64;
        xi += alpha_j * (k * xi_p).sin() * (k * eta_p).cosh();
        eta += alpha_j * (k * xi_p).cos() * (k * eta_p).sinh();
    }

    let hemisphere = if geo.lat_deg < 0.0 {
        Hemisphere::South
    } else {
        Hemisphere::North
    };

    let northing_m = match hemisphere {
        Hemisphere::North => k0_a * xi,
        Hemisphere::South => k0_a * xi + UTM_FALSE_NORTHING_SOUTH_M,
    };

    UtmCoordinate {
        zone,
        hemisphere,
        easting_m: UTM_FALSE_EASTING_M + k0_a * eta,
        northing_m,
        central_meridian_deg,
    }
}

/// Converts [UtmCoordinate] back to [GeodeticCoordinate] (altitude is zero).
pub fn utm_to_geodetic(utm: &UtmCoordinate) -> GeodeticCoordinate {
    let e2 = EARTH_ECCENTRICITY_SQUARED_WGS84;
    let e = e2.sqrt();
    let n = third_flattening();
    let k0_a = UTM_SCALE_FACTOR * rectifying_radius(n);
    let beta = beta(n);

    let northing_m = match utm.hemisphere {
        Hemisphere::North => utm.northing_m,
        Hemisphere::South => utm.northing_m - UTM_FALSE_NORTHING_SOUTH_M,
    };

    let xi = northing_m / k0_a;
    let eta = (utm.easting_m - UTM_FALSE_EASTING_M) / k0_a;

    let (mut xi_p, mut eta_p) = (xi, eta);
    for (j, beta_j) in beta.iter().enumerate() {
        let k = 2.0 * (j + 1) as f64;
        xi_p -= beta_j * (k * xi).sin() * (k * eta).cosh();
        eta_p -= beta_j * (k * xi).cos() * (k * eta).sinh();
    }

    // conformal latitude, as tangent
    let tau_p = xi_p.sin() / (eta_p.sinh().powi(2) + xi_p.cos().powi(2)).sqrt();
    let lambda = eta_p.sinh().atan2(xi_p.cos());

    let mut tau = tau_p;
    for _ in 0..MAX_LATITUDE_ITERATIONS {
        let sigma = (e * (e * tau / (1.0 + tau * tau).sqrt()).atanh()).sinh();
        let tau_i = tau * (1.0 + sigma * sigma).sqrt() - sigma * (1.0 + tau * tau).sqrt();
        let delta = (tau_p - tau_i) / (1.0 + tau_i * tau_i).sqrt() * (1.0 + (1.0 - e2) * tau * tau)
            / ((1.0 - e2) * (1.0 + tau * tau).sqrt());
        tau += delta;
        if delta.abs() < 1.0E-14 {
            break;
        }
    }

    GeodeticCoordinate::new(
        tau.atan().to_degrees(),
        utm.central_meridian_deg + lambda.to_degrees(),
        0.0,
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(-46.6333, 23)]
    #[case(-180.0, 1)]
    #[case(-177.0, 1)]
    #[case(0.0, 31)]
    #[case(4.35, 31)]
    #[case(179.9, 60)]
    #[case(180.0, 60)]
    fn utm_zones(#[case] lon_deg: f64, #[case] expected: u8) {
        assert_eq!(zone(lon_deg), expected);
    }

    #[test]
    fn sao_paulo_reference() {
        let geo = GeodeticCoordinate::new(-23.5505, -46.6333, 760.0);
        let utm = geodetic_to_utm(&geo);

        assert_eq!(utm.zone, 23);
        assert_eq!(utm.hemisphere, Hemisphere::South);
        assert_eq!(utm.central_meridian_deg, -45.0);
        assert!((utm.easting_m - 333_287.915).abs() < 0.01, "{:?}", utm);
        assert!((utm.northing_m - 7_394_588.319).abs() < 0.01, "{:?}", utm);
    }

    #[test]
    fn central_meridian_is_false_easting() {
        let utm = geodetic_to_utm(&GeodeticCoordinate::new(0.0, 3.0, 0.0));
        assert_eq!(utm.zone, 31);
        assert_eq!(utm.hemisphere, Hemisphere::North);
        assert!((utm.easting_m - UTM_FALSE_EASTING_M).abs() < 1.0E-6);
        assert!(utm.northing_m.abs() < 1.0E-6);
    }

    #[rstest]
    #[case(-23.5505, -46.6333)]
    #[case(50.8, 4.35)]
    #[case(60.0, -2.9)]
    #[case(-45.0, 170.0)]
    #[case(-0.5, -50.1)]
    #[case(71.2, 25.7)]
    fn utm_round_trip(#[case] lat_deg: f64, #[case] lon_deg: f64) {
        let geo = GeodeticCoordinate::new(lat_deg, lon_deg, 0.0);
        let back = utm_to_geodetic(&geodetic_to_utm(&geo));
        assert!((back.lat_deg - lat_deg).abs() < 1.0E-9, "{:?}", back);
        assert!((back.lon_deg - lon_deg).abs() < 1.0E-9, "{:?}", back);
    }
}
