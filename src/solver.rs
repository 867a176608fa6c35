//! Epoch wise least squares positioning
use log::debug;
use nalgebra::{Matrix1x4, Vector3};

use crate::{
    bias::ExponentialTroposphere,
    cfg::{Modeling, SolverOpts},
    navigation::{DilutionOfPrecision, MatrixContribution, Navigation, PositionEstimate, State},
    orbit::{OrbitSource, SatellitePosition},
    prelude::{Error, SV},
    rinex::RinexEpoch,
};

/// Explicit [PositioningSolver] accumulator, folded over the epochs
#[derive(Debug, Clone, PartialEq)]
pub struct SolverState {
    /// A priori ECEF position (m), seeds the very first resolution
    pub apriori_m: Vector3<f64>,
    /// Resolved [PositionEstimate]s, in chronological order
    pub estimates: Vec<PositionEstimate>,
    /// Number of epochs that could not be resolved
    pub rejected: usize,
    /// Outcome of the latest epoch
    pub last_error: Option<Error>,
}

impl SolverState {
    /// Creates new [SolverState], from a priori ECEF position (m)
    pub fn new(apriori_m: Vector3<f64>) -> Self {
        Self {
            apriori_m,
            estimates: Vec::new(),
            rejected: 0,
            last_error: None,
        }
    }

    /// Seed of the next resolution: previous solution when it exists,
    /// a priori position otherwise. Returns ECEF (m) and clock bias (m).
    pub fn seed(&self) -> (Vector3<f64>, f64) {
        match self.estimates.last() {
            Some(previous) => (previous.pos_m, previous.clock_bias_m),
            None => (self.apriori_m, 0.0),
        }
    }

    /// Number of degraded [PositionEstimate]s
    pub fn degraded(&self) -> usize {
        self.estimates.iter().filter(|e| e.degraded).count()
    }
}

/// Usable line of sight
#[derive(Debug, Clone, Copy)]
struct Candidate {
    position: SatellitePosition,
    pseudorange_m: f64,
}

/// [PositioningSolver] resolves one [PositionEstimate] per epoch,
/// by iterative linearized least squares.
pub struct PositioningSolver<'o> {
    /// [SolverOpts]
    opts: SolverOpts,
    /// Physical [Modeling]
    modeling: Modeling,
    /// Troposphere model
    tropo: ExponentialTroposphere,
    /// [OrbitSource]
    orbit: &'o dyn OrbitSource,
}

impl<'o> PositioningSolver<'o> {
    /// Creates new [PositioningSolver]
    /// ## Input
    /// - opts: [SolverOpts]
    /// - modeling: physical [Modeling]
    /// - orbit: [OrbitSource] that places each satellite
    pub fn new(opts: SolverOpts, modeling: Modeling, orbit: &'o dyn OrbitSource) -> Self {
        Self {
            opts,
            modeling,
            orbit,
            tropo: ExponentialTroposphere::default(),
        }
    }

    /// Copies and returns [Self] with customized troposphere model
    pub fn with_troposphere(mut self, tropo: ExponentialTroposphere) -> Self {
        self.tropo = tropo;
        self
    }

    /// Selects usable lines of sight
    fn candidates(&self, epoch: &RinexEpoch) -> Vec<Candidate> {
        epoch
            .observations
            .iter()
            .filter_map(|(sv, obs)| {
                if obs.signal_strength_s1 <= self.opts.min_snr {
                    debug!(
                        "{} ({}) : snr {:.1} dB-Hz below mask",
                        epoch.t, sv, obs.signal_strength_s1
                    );
                    return None;
                }
                if obs.pseudorange_c1 <= 0.0 {
                    return None;
                }
                match self.orbit.position(*sv, epoch.t) {
                    Some(position) => Some(Candidate {
                        position,
                        pseudorange_m: obs.pseudorange_c1,
                    }),
                    None => {
                        debug!("{} ({}) : unresolved orbit", epoch.t, sv);
                        None
                    },
                }
            })
            .collect()
    }

    /// Linearizes each line of sight at current [State]
    fn contributions(&self, state: &State, candidates: &[Candidate]) -> Vec<MatrixContribution> {
        let tropo_m = if self.modeling.tropo_delay {
            self.tropo.delay_m(state.geodetic.alt_m)
        } else {
            0.0
        };

        candidates
            .iter()
            .map(|cd| {
                let los_m = cd.position.ecef_m - state.pos_m;
                let rho_m = los_m.norm();
                let unit = los_m / rho_m;

                MatrixContribution {
                    h: Matrix1x4::new(-unit[0], -unit[1], -unit[2], 1.0),
                    b: cd.pseudorange_m - (rho_m + state.clock_bias_m + tropo_m),
                }
            })
            .collect()
    }

    /// [PositionEstimate] resolution attempt.
    /// ## Input
    /// - epoch: [RinexEpoch] to resolve
    /// - seed_m: initial ECEF position (m)
    /// - clock_bias_m: initial clock bias (m)
    /// ## Returns
    /// - [PositionEstimate], possibly degraded when the geometry became singular
    /// - [Error::InsufficientSatellites] when less than 4 lines of sight are usable
    pub fn resolve(
        &self,
        epoch: &RinexEpoch,
        seed_m: &Vector3<f64>,
        clock_bias_m: f64,
    ) -> Result<PositionEstimate, Error> {
        let candidates = self.candidates(epoch);

        if candidates.len() < self.opts.min_sv {
            return Err(Error::InsufficientSatellites(candidates.len()));
        }

        let mut state = State::from_ecef_m(epoch.t, *seed_m, clock_bias_m);
        let mut iterations = 0;
        let mut degraded = false;

        while iterations < self.opts.max_iterations {
            let mut nav = Navigation::new(&self.contributions(&state, &candidates))?;

            if let Err(e) = nav.iter() {
                debug!("{} : {} (keeping last valid estimate)", epoch.t, e);
                degraded = true;
                break;
            }

            state.update(&nav.dx);
            iterations += 1;

            let correction_m = nav.dx.fixed_rows::<3>(0).norm();
            debug!("{} : iteration #{} |dx|={:.3E}m {}", state.t, iterations, correction_m, state);

            if correction_m < self.opts.convergence_m {
                break;
            }
        }

        // post fit
        let nav = Navigation::new(&self.contributions(&state, &candidates))?;

        let dop = if degraded {
            DilutionOfPrecision::sentinel()
        } else {
            match nav.covariance() {
                Ok(q) => DilutionOfPrecision::new(&q),
                Err(e) => {
                    debug!("{} : {}", epoch.t, e);
                    degraded = true;
                    DilutionOfPrecision::sentinel()
                },
            }
        };

        let sv = candidates
            .iter()
            .map(|cd| cd.position.sv)
            .collect::<Vec<SV>>();

        Ok(PositionEstimate {
            epoch: epoch.t,
            pos_m: state.pos_m,
            clock_bias_m: state.clock_bias_m,
            residuals: nav.residuals().clone(),
            h: nav.design_matrix().clone(),
            sv,
            dop,
            iterations,
            degraded,
        })
    }

    /// Folds one more [RinexEpoch] into [SolverState]. Epochs that
    /// cannot be resolved are counted and skipped, this never fails.
    pub fn fold(&self, mut state: SolverState, epoch: &RinexEpoch) -> SolverState {
        let (seed_m, clock_bias_m) = state.seed();

        match self.resolve(epoch, &seed_m, clock_bias_m) {
            Ok(estimate) => {
                state.estimates.push(estimate);
                state.last_error = None;
            },
            Err(e) => {
                debug!("{} : {}", epoch.t, e);
                state.rejected += 1;
                state.last_error = Some(e);
            },
        }

        state
    }
}
