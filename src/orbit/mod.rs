use crate::prelude::{Epoch, Vector3, SV};

#[cfg(feature = "serde")]
use serde::Serialize;

mod circular;

pub use circular::{CircularOrbitModel, OrbitalFamily};

/// [SV] position, expressed in the same ECEF frame as the receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SatellitePosition {
    /// [SV] this position refers to
    pub sv: SV,
    /// ECEF coordinates in meters
    pub ecef_m: Vector3<f64>,
}

impl SatellitePosition {
    pub fn new(sv: SV, ecef_m: Vector3<f64>) -> Self {
        Self { sv, ecef_m }
    }

    /// Geometric range (m) to given ECEF position (m)
    pub fn range_m(&self, rx_m: &Vector3<f64>) -> f64 {
        (self.ecef_m - rx_m).norm()
    }
}

/// Any satellite position provider should implement the [OrbitSource] trait
/// to contribute to the solving process.
///
/// Requests follow the measurements, which are processed in chronological order.
/// Any error here directly reflects on the accuracy of the solution.
/// Returning `None` simply drops this [SV] from the current epoch.
pub trait OrbitSource {
    /// Returns [SatellitePosition] of this [SV] at requested [Epoch].
    fn position(&self, sv: SV, t: Epoch) -> Option<SatellitePosition>;
}

impl<T: OrbitSource + ?Sized> OrbitSource for &T {
    fn position(&self, sv: SV, t: Epoch) -> Option<SatellitePosition> {
        (**self).position(sv, t)
    }
}
