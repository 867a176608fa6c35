//! Approximate circular orbits, parametrized per constellation.
use std::f64::consts::TAU;

use crate::{
    constants::{EARTH_ANGULAR_VEL_RAD, EARTH_GRAVITATION_MU_M3_S2},
    orbit::{OrbitSource, SatellitePosition},
    prelude::{Constellation, Epoch, Vector3, SV},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of fixed point iterations, solving Kepler's equation
const KEPLER_ITERATIONS: usize = 5;

/// Nominal orbital parameters of one constellation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalFamily {
    /// Semi major axis (m)
    pub semi_major_axis_m: f64,
    /// Orbital plane inclination (ddeg)
    pub inclination_deg: f64,
    pub eccentricity: f64,
}

impl OrbitalFamily {
    const ECCENTRICITY: f64 = 1.0E-4;

    /// Returns [OrbitalFamily] of this [Constellation], if we support it.
    pub fn from_constellation(constellation: Constellation) -> Option<Self> {
        let (semi_major_axis_km, inclination_deg) = match constellation {
            Constellation::GPS => (26_559.7, 55.0),
            Constellation::Glonass => (25_510.0, 64.8),
            Constellation::Galileo => (29_600.0, 56.0),
            Constellation::BeiDou => (27_906.0, 55.0),
            _ => return None,
        };
        Some(Self {
            semi_major_axis_m: semi_major_axis_km * 1.0E3,
            inclination_deg,
            eccentricity: Self::ECCENTRICITY,
        })
    }

    /// Mean motion (rad.s⁻¹)
    pub fn mean_motion_rad_s(&self) -> f64 {
        (EARTH_GRAVITATION_MU_M3_S2 / self.semi_major_axis_m.powi(3)).sqrt()
    }
}

/// Solves Kepler's equation E = M + e sin(E), by fixed point iteration.
fn eccentric_anomaly(mean_anomaly_rad: f64, eccentricity: f64) -> f64 {
    let mut e_k = mean_anomaly_rad;
    for _ in 0..KEPLER_ITERATIONS {
        e_k = mean_anomaly_rad + eccentricity * e_k.sin();
    }
    e_k
}

/// [CircularOrbitModel] places satellites on nominal, near circular orbits.
/// This is not broadcast ephemeris: absolute positions are not geodetic grade,
/// but the relative geometry is realistic enough to exercise the solver.
///
/// The argument of perigee is PRN x 30° and the right ascension of the
/// ascending node is PRN x 60°, with time counted in GPS seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CircularOrbitModel {
    /// Rotate the orbital plane into the Earth fixed frame
    pub earth_rotation: bool,
}

impl Default for CircularOrbitModel {
    fn default() -> Self {
        Self {
            earth_rotation: true,
        }
    }
}

impl CircularOrbitModel {
    pub fn new(earth_rotation: bool) -> Self {
        Self { earth_rotation }
    }

    /// Returns ECEF coordinates (m) of this [SV] at `t_gpst_s` GPS seconds.
    pub fn position_at(&self, sv: SV, t_gpst_s: f64) -> Option<Vector3<f64>> {
        let family = OrbitalFamily::from_constellation(sv.constellation)?;

        let (a, e) = (family.semi_major_axis_m, family.eccentricity);
        let prn = f64::from(sv.prn);

        let m_k = (family.mean_motion_rad_s() * t_gpst_s).rem_euclid(TAU);
        let e_k = eccentric_anomaly(m_k, e);

        let nu_k = 2.0
            * ((1.0 + e).sqrt() * (e_k / 2.0).sin()).atan2((1.0 - e).sqrt() * (e_k / 2.0).cos());

        let r_k = a * (1.0 - e * e_k.cos());

        let omega = (prn * 30.0).to_radians();
        let mut raan = (prn * 60.0).to_radians();
        if self.earth_rotation {
            raan -= EARTH_ANGULAR_VEL_RAD * t_gpst_s;
        }
        let raan = raan.rem_euclid(TAU);

        // argument of latitude
        let u_k = omega + nu_k;
        let i_k = family.inclination_deg.to_radians();

        let (sin_u, cos_u) = u_k.sin_cos();
        let (sin_raan, cos_raan) = raan.sin_cos();
        let (sin_i, cos_i) = i_k.sin_cos();

        Some(Vector3::new(
            r_k * (cos_u * cos_raan - sin_u * cos_i * sin_raan),
            r_k * (cos_u * sin_raan + sin_u * cos_i * cos_raan),
            r_k * sin_u * sin_i,
        ))
    }
}

impl OrbitSource for CircularOrbitModel {
    fn position(&self, sv: SV, t: Epoch) -> Option<SatellitePosition> {
        let ecef_m = self.position_at(sv, t.to_gpst_seconds())?;
        Some(SatellitePosition::new(sv, ecef_m))
    }
}
