use nalgebra::{DVector, Matrix1x4, Matrix4, MatrixXx4, Vector4};

mod dop;
mod solutions;
mod state;

pub use dop::DilutionOfPrecision;
pub use solutions::PositionEstimate;

pub(crate) use state::State;

use crate::prelude::Error;

/// One line of sight contribution to the linearized system
#[derive(Debug, Clone, Copy)]
pub(crate) struct MatrixContribution {
    pub h: Matrix1x4<f64>,
    pub b: f64,
}

/// Linearized least squares system, at one given [State].
#[derive(Debug, Clone)]
pub(crate) struct Navigation {
    b: DVector<f64>,
    h: MatrixXx4<f64>,
    pub dx: Vector4<f64>,
}

impl Navigation {
    /// Create new [Navigation] system
    /// ## Input
    /// - contributions: one [MatrixContribution] per line of sight
    /// ## Returns
    /// - [Navigation], [Error]
    pub fn new(contributions: &[MatrixContribution]) -> Result<Self, Error> {
        const MIN_SIZE: usize = 4;
        let size = contributions.len();

        if size < MIN_SIZE {
            return Err(Error::InsufficientSatellites(size));
        }

        let mut b = DVector::<f64>::zeros(size);
        let mut h = MatrixXx4::<f64>::zeros(size);

        for (i, contribution) in contributions.iter().enumerate() {
            for j in 0..4 {
                h[(i, j)] = contribution.h[(0, j)];
            }
            b[i] = contribution.b;
        }

        Ok(Self {
            b,
            h,
            dx: Vector4::zeros(),
        })
    }

    /// Returns (HᵗH)⁻¹, when the geometry permits it.
    pub fn covariance(&self) -> Result<Matrix4<f64>, Error> {
        let ht = self.h.transpose();
        let ht_h: Matrix4<f64> = ht * &self.h;
        ht_h.try_inverse().ok_or(Error::SingularNormalEquations)
    }

    /// Iterates this [Navigation] system: solves Δx = (HᵗH)⁻¹Hᵗb
    pub fn iter(&mut self) -> Result<(), Error> {
        let ht_h_inv = self.covariance()?;
        let ht_b = self.h.transpose() * &self.b;

        let dx = ht_h_inv * ht_b;
        if dx.iter().any(|dx| !dx.is_finite()) {
            return Err(Error::SingularNormalEquations);
        }

        self.dx = dx;
        Ok(())
    }

    /// Residual vector b
    pub fn residuals(&self) -> &DVector<f64> {
        &self.b
    }

    /// Design matrix H
    pub fn design_matrix(&self) -> &MatrixXx4<f64> {
        &self.h
    }
}
