use log::{debug, info};
use nalgebra::{DVector, MatrixXx4};

use rand::{rngs::SmallRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    navigation::{DilutionOfPrecision, PositionEstimate},
    prelude::{Vector3, SV},
    quality::{QualityTier, WindowSummary},
    rinex::{RinexEpoch, RinexRecord},
};

/// Precision figures of one session
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PrecisionAssessment {
    /// Horizontal precision (m)
    pub horizontal_m: f64,
    /// Vertical precision (m)
    pub vertical_m: f64,
    /// Session [DilutionOfPrecision]
    pub dop: DilutionOfPrecision,
}

/// [PrecisionModel] turns a sequence of [PositionEstimate]s into
/// session precision figures. Substitute a genuine multi-epoch
/// estimator here to obtain actual accuracy figures.
pub trait PrecisionModel {
    /// Convergence fraction, within [0, 1], of the `index`-th
    /// [PositionEstimate] of the session.
    fn convergence(&mut self, index: usize, estimate: &PositionEstimate) -> f64;

    /// Derives [PrecisionAssessment] of the stable window, once classified.
    fn assess(&mut self, tier: QualityTier, window: &WindowSummary) -> PrecisionAssessment;
}

/// Precision derived from solver outputs only. Reproducible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeterministicPrecision {
    /// Reference error (m)
    pub reference_sigma_m: f64,
}

impl Default for DeterministicPrecision {
    fn default() -> Self {
        Self {
            reference_sigma_m: 0.5,
        }
    }
}

impl DeterministicPrecision {
    pub fn new(reference_sigma_m: f64) -> Self {
        Self { reference_sigma_m }
    }
}

impl PrecisionModel for DeterministicPrecision {
    fn convergence(&mut self, _: usize, estimate: &PositionEstimate) -> f64 {
        if estimate.degraded {
            return 0.0;
        }
        let sigma_m = estimate.dop.hdop * estimate.rms_residual_m();
        let convergence = (-sigma_m / self.reference_sigma_m).exp();
        if convergence.is_finite() {
            convergence.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn assess(&mut self, tier: QualityTier, window: &WindowSummary) -> PrecisionAssessment {
        let bands = tier.bands();

        let horizontal_m = window
            .horizontal_sigma_m
            .map(|sigma| sigma.clamp(bands.horizontal_m.0, bands.horizontal_m.1))
            .unwrap_or(bands.horizontal_m.1);

        let vertical_m = window
            .vertical_sigma_m
            .map(|sigma| sigma.clamp(bands.vertical_m.0, bands.vertical_m.1))
            .unwrap_or(bands.vertical_m.1);

        let dop = window
            .dop
            .unwrap_or(DilutionOfPrecision::from_horizontal_vertical(
                bands.hdop.1,
                bands.vdop.1,
            ));

        PrecisionAssessment {
            horizontal_m,
            vertical_m,
            dop,
        }
    }
}

/// Demonstration [PrecisionModel]: synthesizes an exponential convergence
/// with temporally correlated noise, then draws precision figures within
/// the tier ranges. Figures are not geodetic grade and not reproducible,
/// unless seeded.
#[derive(Debug, Clone)]
pub struct SimulatedPrecision {
    rng: SmallRng,
    /// Correlated position perturbation
    noise: Vector3<f64>,
}

impl SimulatedPrecision {
    /// Convergence time constant, in epochs
    const TIME_CONSTANT: f64 = 180.0;
    /// Initial noise (m)
    const INITIAL_NOISE_M: f64 = 8.0;
    /// Converged noise (m)
    const FINAL_NOISE_M: f64 = 0.04;
    /// Temporal correlation
    const ALPHA: f64 = 0.95;
    /// Residuals to position noise ratio
    const RESIDUAL_RATIO: f64 = 0.15;

    /// Creates new [SimulatedPrecision], seeded from the OS when `seed` is not defined.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            rng,
            noise: Vector3::zeros(),
        }
    }

    /// Decay factor of the `index`-th epoch
    fn decay(index: usize) -> f64 {
        (-(index as f64) / Self::TIME_CONSTANT).exp()
    }

    fn normal(&mut self, sigma: f64) -> f64 {
        let x: f64 = self.rng.sample(StandardNormal);
        x * sigma
    }

    fn uniform(&mut self, range: (f64, f64)) -> f64 {
        if range.1 > range.0 {
            self.rng.random_range(range.0..range.1)
        } else {
            range.0
        }
    }

    /// Synthesizes the `index`-th [PositionEstimate] of the session,
    /// scattered around `base_m`. The perturbation is correlated with
    /// the previous call.
    pub fn synthesize_epoch(
        &mut self,
        index: usize,
        epoch: &RinexEpoch,
        base_m: &Vector3<f64>,
    ) -> PositionEstimate {
        let decay = Self::decay(index);
        let scale = Self::INITIAL_NOISE_M * decay + Self::FINAL_NOISE_M;

        let draw = Vector3::new(self.normal(scale), self.normal(scale), self.normal(scale));

        self.noise = if index == 0 {
            draw
        } else {
            self.noise * Self::ALPHA + draw * (1.0 - Self::ALPHA)
        };

        let sv = epoch.sv().collect::<Vec<SV>>();
        let residuals = DVector::from_fn(sv.len(), |_, _| {
            self.normal(scale * Self::RESIDUAL_RATIO)
        });

        if index > 0 && index % 500 == 0 {
            debug!(
                "{} : synthetic convergence {:.1}%, noise {:.3}m",
                epoch.t,
                (1.0 - decay) * 100.0,
                scale
            );
        }

        PositionEstimate {
            epoch: epoch.t,
            pos_m: base_m + self.noise,
            clock_bias_m: 0.0,
            residuals,
            sv,
            h: MatrixXx4::zeros(0),
            dop: DilutionOfPrecision::from_horizontal_vertical(
                0.7 + 0.6 * decay,
                1.3 + 1.2 * decay,
            ),
            iterations: 0,
            degraded: false,
        }
    }

    /// Synthesizes one [PositionEstimate] per epoch of this [RinexRecord].
    pub fn synthesize(&mut self, record: &RinexRecord, base_m: &Vector3<f64>) -> Vec<PositionEstimate> {
        let estimates = record
            .epochs
            .iter()
            .enumerate()
            .map(|(index, epoch)| self.synthesize_epoch(index, epoch, base_m))
            .collect::<Vec<_>>();

        info!("{} synthetic estimates", estimates.len());
        estimates
    }
}

impl PrecisionModel for SimulatedPrecision {
    fn convergence(&mut self, index: usize, _: &PositionEstimate) -> f64 {
        1.0 - Self::decay(index)
    }

    fn assess(&mut self, tier: QualityTier, _: &WindowSummary) -> PrecisionAssessment {
        let bands = tier.bands();
        PrecisionAssessment {
            horizontal_m: self.uniform(bands.horizontal_m),
            vertical_m: self.uniform(bands.vertical_m),
            dop: DilutionOfPrecision::from_horizontal_vertical(
                self.uniform(bands.hdop),
                self.uniform(bands.vdop),
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::prelude::{Constellation, Epoch};
    use rstest::*;

    fn estimate(hdop: f64, residual_m: f64, degraded: bool) -> PositionEstimate {
        PositionEstimate {
            epoch: Epoch::from_gregorian_utc_at_midnight(2024, 1, 1),
            pos_m: Vector3::new(3752778.0, -4538402.0, -2442731.0),
            clock_bias_m: 0.0,
            residuals: DVector::from_element(4, residual_m),
            sv: (1..=4).map(|prn| SV::new(Constellation::GPS, prn)).collect(),
            h: MatrixXx4::zeros(4),
            dop: DilutionOfPrecision {
                pdop: (hdop * hdop + 1.0).sqrt(),
                hdop,
                vdop: 1.0,
            },
            iterations: 3,
            degraded,
        }
    }

    #[test]
    fn deterministic_convergence() {
        let mut model = DeterministicPrecision::default();
        assert_eq!(model.convergence(0, &estimate(1.0, 0.0, false)), 1.0);
        assert_eq!(model.convergence(0, &estimate(1.0, 0.0, true)), 0.0);

        let c = model.convergence(0, &estimate(2.0, 0.25, false));
        assert!((c - (-1.0_f64).exp()).abs() < 1.0E-12);

        let worse = model.convergence(0, &estimate(2.0, 1.0, false));
        assert!(worse < c);
    }

    #[rstest]
    #[case(QualityTier::Excellent)]
    #[case(QualityTier::Good)]
    #[case(QualityTier::Fair)]
    #[case(QualityTier::Poor)]
    #[case(QualityTier::NoSolution)]
    fn deterministic_bands(#[case] tier: QualityTier) {
        let bands = tier.bands();
        let mut model = DeterministicPrecision::default();

        let window = WindowSummary {
            horizontal_sigma_m: Some(0.0),
            vertical_sigma_m: Some(100.0),
            ..Default::default()
        };
        let assessment = model.assess(tier, &window);
        assert_eq!(assessment.horizontal_m, bands.horizontal_m.0);
        assert_eq!(assessment.vertical_m, bands.vertical_m.1);
        assert_eq!(assessment.dop.hdop, bands.hdop.1);
        assert_eq!(assessment.dop.vdop, bands.vdop.1);
        let dop = assessment.dop;
        assert!((dop.pdop.powi(2) - dop.hdop.powi(2) - dop.vdop.powi(2)).abs() < 1.0E-9);
    }

    #[rstest]
    #[case(QualityTier::Excellent)]
    #[case(QualityTier::Fair)]
    #[case(QualityTier::NoSolution)]
    fn simulated_bands(#[case] tier: QualityTier) {
        let bands = tier.bands();
        let mut model = SimulatedPrecision::new(Some(42));
        for _ in 0..100 {
            let assessment = model.assess(tier, &WindowSummary::default());
            assert!(assessment.horizontal_m >= bands.horizontal_m.0);
            assert!(assessment.horizontal_m < bands.horizontal_m.1);
            assert!(assessment.vertical_m >= bands.vertical_m.0);
            assert!(assessment.vertical_m < bands.vertical_m.1);
            assert!(assessment.dop.hdop >= bands.hdop.0);
            assert!(assessment.dop.hdop < bands.hdop.1);
            let dop = assessment.dop;
            assert!((dop.pdop.powi(2) - dop.hdop.powi(2) - dop.vdop.powi(2)).abs() < 1.0E-9);
        }
    }

    #[test]
    fn simulated_convergence() {
        let mut model = SimulatedPrecision::new(Some(1));
        let e = estimate(1.0, 0.0, false);
        assert_eq!(model.convergence(0, &e), 0.0);
        let mut prev = 0.0;
        for i in [1, 10, 180, 1_000] {
            let c = model.convergence(i, &e);
            assert!(c > prev && c < 1.0);
            prev = c;
        }
    }

    #[test]
    fn synthesized_estimates() {
        use crate::rinex::{Observation, RinexEpoch};

        let t0 = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
        let observation = Observation {
            pseudorange_c1: 2.0E7,
            carrier_l1: None,
            signal_strength_s1: 45.0,
        };

        let record = RinexRecord {
            epochs: (0..600)
                .map(|i| RinexEpoch {
                    t: t0 + crate::prelude::Duration::from_seconds(i as f64),
                    flag: 0,
                    observations: (1..=5)
                        .map(|prn| (SV::new(Constellation::GPS, prn), observation))
                        .collect(),
                })
                .collect(),
            ..Default::default()
        };

        let base_m = Vector3::new(3752778.0, -4538402.0, -2442731.0);
        let estimates = SimulatedPrecision::new(Some(7)).synthesize(&record, &base_m);

        assert_eq!(estimates.len(), 600);
        for (i, estimate) in estimates.iter().enumerate() {
            assert_eq!(estimate.epoch, record.epochs[i].t);
            assert_eq!(estimate.sv.len(), 5);
            assert_eq!(estimate.residuals.len(), 5);
            assert!(!estimate.degraded);
        }

        // converges towards the base position
        let first = (estimates[0].dop.hdop, estimates[0].dop.pdop);
        let last = estimates[599].dop;
        assert!(last.hdop < first.0 && last.pdop < first.1);
        assert!((estimates[599].pos_m - base_m).norm() < 1.0);

        // reproducible when seeded
        let again = SimulatedPrecision::new(Some(7)).synthesize(&record, &base_m);
        assert_eq!(again, estimates);
    }
}
