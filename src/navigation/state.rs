use nalgebra::Vector4;

use crate::{
    coords::GeodeticCoordinate,
    prelude::{Epoch, Vector3},
};

/// Receiver [State] during one epoch resolution
#[derive(Debug, Clone, Copy)]
pub(crate) struct State {
    /// [Epoch] of resolution
    pub t: Epoch,
    /// ECEF position (m)
    pub pos_m: Vector3<f64>,
    /// Receiver clock bias, in meters of delay
    pub clock_bias_m: f64,
    /// Geodetic coordinates of [Self::pos_m]
    pub geodetic: GeodeticCoordinate,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "x={:.3}m y={:.3}m z={:.3}m dt={:.3}m",
            self.pos_m[0], self.pos_m[1], self.pos_m[2], self.clock_bias_m
        )
    }
}

impl State {
    /// Create new [State] from ECEF coordinates (m) and clock bias (m)
    pub fn from_ecef_m(t: Epoch, pos_m: Vector3<f64>, clock_bias_m: f64) -> Self {
        Self {
            t,
            pos_m,
            clock_bias_m,
            geodetic: GeodeticCoordinate::from_ecef(&pos_m),
        }
    }

    /// Applies additive correction
    pub fn update(&mut self, dx: &Vector4<f64>) {
        self.pos_m[0] += dx[0];
        self.pos_m[1] += dx[1];
        self.pos_m[2] += dx[2];
        self.clock_bias_m += dx[3];
        self.geodetic = GeodeticCoordinate::from_ecef(&self.pos_m);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn state_update() {
        let t = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
        let mut state = State::from_ecef_m(t, Vector3::new(6378137.0, 0.0, 0.0), 0.0);
        assert!(state.geodetic.alt_m.abs() < 1.0E-6);

        state.update(&Vector4::new(10.0, 0.0, 0.0, 5.0));
        assert_eq!(state.pos_m[0], 6378147.0);
        assert_eq!(state.clock_bias_m, 5.0);
        assert!((state.geodetic.alt_m - 10.0).abs() < 1.0E-6);
    }
}
