use nalgebra::{DVector, MatrixXx4};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    coords::GeodeticCoordinate,
    navigation::DilutionOfPrecision,
    prelude::{Epoch, Vector3, SV},
};

/// [PositionEstimate] resolved for one epoch
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PositionEstimate {
    /// [Epoch] of resolution
    pub epoch: Epoch,
    /// ECEF position (m)
    pub pos_m: Vector3<f64>,
    /// Receiver clock bias, in meters of delay
    pub clock_bias_m: f64,
    /// Post fit residuals (m), one per [SV]
    pub residuals: DVector<f64>,
    /// [SV]s that contributed, in the order of the residuals
    pub sv: Vec<SV>,
    /// Design matrix at the final position
    pub h: MatrixXx4<f64>,
    /// [DilutionOfPrecision] of this geometry
    pub dop: DilutionOfPrecision,
    /// Number of iterations performed
    pub iterations: usize,
    /// Normal equations became singular: [Self] is the last valid
    /// estimate and [Self::dop] is the sentinel.
    pub degraded: bool,
}

impl PositionEstimate {
    /// Root mean square of the post fit residuals (m)
    pub fn rms_residual_m(&self) -> f64 {
        let n = self.residuals.len();
        if n == 0 {
            return 0.0;
        }
        (self.residuals.norm_squared() / n as f64).sqrt()
    }

    /// [GeodeticCoordinate] of this estimate
    pub fn geodetic(&self) -> GeodeticCoordinate {
        GeodeticCoordinate::from_ecef(&self.pos_m)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rms_residual() {
        let mut estimate = PositionEstimate {
            epoch: Epoch::from_gregorian_utc_at_midnight(2024, 1, 1),
            pos_m: Vector3::new(6378137.0, 0.0, 0.0),
            clock_bias_m: 0.0,
            residuals: DVector::from_vec(vec![3.0, -3.0, 3.0, -3.0]),
            sv: vec![],
            h: MatrixXx4::zeros(0),
            dop: DilutionOfPrecision::sentinel(),
            iterations: 0,
            degraded: true,
        };
        assert_eq!(estimate.rms_residual_m(), 3.0);

        estimate.residuals = DVector::zeros(0);
        assert_eq!(estimate.rms_residual_m(), 0.0);
        assert!(estimate.geodetic().lat_deg.abs() < 1.0E-9);
    }
}
