use nalgebra::{Matrix4, MatrixXx4};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::constants::DOP_SENTINEL;

/// [DilutionOfPrecision] of one geometry, from the diagonal of (HᵗH)⁻¹,
/// expressed in the ECEF frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DilutionOfPrecision {
    /// Position DOP
    pub pdop: f64,
    /// Horizontal DOP
    pub hdop: f64,
    /// Vertical DOP
    pub vdop: f64,
}

impl Default for DilutionOfPrecision {
    fn default() -> Self {
        Self::sentinel()
    }
}

impl DilutionOfPrecision {
    /// Degenerate geometry marker
    pub fn sentinel() -> Self {
        Self {
            pdop: DOP_SENTINEL,
            hdop: DOP_SENTINEL,
            vdop: DOP_SENTINEL,
        }
    }

    /// True when this is the degenerate geometry marker
    pub fn is_sentinel(&self) -> bool {
        *self == Self::sentinel()
    }

    /// Creates new [DilutionOfPrecision] from its horizontal and vertical
    /// components, PDOP being their quadratic sum.
    pub fn from_horizontal_vertical(hdop: f64, vdop: f64) -> Self {
        Self {
            pdop: (hdop * hdop + vdop * vdop).sqrt(),
            hdop,
            vdop,
        }
    }

    /// Creates new [DilutionOfPrecision] from (HᵗH)⁻¹.
    /// Non finite or negative diagonal terms yield the sentinel.
    pub fn new(q: &Matrix4<f64>) -> Self {
        let (qxx, qyy, qzz) = (q[(0, 0)], q[(1, 1)], q[(2, 2)]);

        if [qxx, qyy, qzz].iter().any(|q| !q.is_finite() || *q < 0.0) {
            return Self::sentinel();
        }

        Self {
            pdop: (qxx + qyy + qzz).sqrt(),
            hdop: (qxx + qyy).sqrt(),
            vdop: qzz.sqrt(),
        }
    }

    /// Creates new [DilutionOfPrecision] from design matrix H.
    /// Singular geometries yield the sentinel.
    pub fn from_design_matrix(h: &MatrixXx4<f64>) -> Self {
        let ht_h: Matrix4<f64> = h.transpose() * h;
        match ht_h.try_inverse() {
            Some(q) => Self::new(&q),
            None => Self::sentinel(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dop_identity() {
        let dop = DilutionOfPrecision::new(&Matrix4::identity());
        assert!((dop.pdop - 3.0_f64.sqrt()).abs() < 1.0E-12);
        assert!((dop.hdop - 2.0_f64.sqrt()).abs() < 1.0E-12);
        assert_eq!(dop.vdop, 1.0);
        assert!((dop.pdop.powi(2) - dop.hdop.powi(2) - dop.vdop.powi(2)).abs() < 1.0E-12);
    }

    #[test]
    fn dop_sentinel() {
        let mut q = Matrix4::identity();
        q[(2, 2)] = -1.0;
        assert!(DilutionOfPrecision::new(&q).is_sentinel());

        q[(2, 2)] = f64::NAN;
        assert!(DilutionOfPrecision::new(&q).is_sentinel());

        let h = MatrixXx4::from_row_slice(&[1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
        assert!(DilutionOfPrecision::from_design_matrix(&h).is_sentinel());
        assert_eq!(DilutionOfPrecision::default().pdop, 99.9);
    }

    #[test]
    fn dop_from_components() {
        let dop = DilutionOfPrecision::from_horizontal_vertical(3.0, 4.0);
        assert_eq!(dop.pdop, 5.0);
        assert_eq!(dop.hdop, 3.0);
        assert_eq!(dop.vdop, 4.0);
    }
}
