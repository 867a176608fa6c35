use log::{info, warn};

use crate::{
    navigation::PositionEstimate,
    prelude::{Epoch, Error},
};

/// [Tracer] emits diagnostic traces once per session,
/// further occurrences only show at debug level.
#[derive(Debug, Default, Clone)]
pub(crate) struct Tracer {
    first_solution: bool,
    first_rejection: bool,
    first_degraded: bool,
}

impl Tracer {
    pub fn solution(&mut self, estimate: &PositionEstimate) {
        if estimate.degraded {
            if !self.first_degraded {
                warn!(
                    "{} : degenerate geometry, degraded estimate (further occurrences not reported)",
                    estimate.epoch
                );
                self.first_degraded = true;
            }
        } else if !self.first_solution {
            let geo = estimate.geodetic();
            info!(
                "{} : first solution lat={:.6}° lon={:.6}° alt={:.3}m ({} iterations)",
                estimate.epoch, geo.lat_deg, geo.lon_deg, geo.alt_m, estimate.iterations
            );
            self.first_solution = true;
        }
    }

    pub fn rejection(&mut self, t: Epoch, e: &Error) {
        if !self.first_rejection {
            warn!(
                "{} : epoch rejected: {} (further rejections not reported)",
                t, e
            );
            self.first_rejection = true;
        }
    }
}
