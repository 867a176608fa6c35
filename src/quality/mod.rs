//! Session quality: aggregates [PositionEstimate]s into
//! a session position, precision figures and a compliance verdict.
use itertools::Itertools;
use log::{info, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    averager::Averager,
    cfg::ClassifierOpts,
    constants::NO_SOLUTION_SENTINEL,
    navigation::{DilutionOfPrecision, PositionEstimate},
    prelude::{Vector3, SV},
};

mod precision;
mod tier;

pub use precision::{
    DeterministicPrecision, PrecisionAssessment, PrecisionModel, SimulatedPrecision,
};
pub use tier::{QualityTier, TierBands};

/// Solver statistics of the stable window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowSummary {
    /// Number of estimates in the window
    pub len: usize,
    /// Mean convergence fraction
    pub mean_convergence: f64,
    /// Mean HDOP x RMS residual (m), of non degraded estimates
    pub horizontal_sigma_m: Option<f64>,
    /// Mean VDOP x RMS residual (m), of non degraded estimates
    pub vertical_sigma_m: Option<f64>,
    /// Mean [DilutionOfPrecision], of non degraded estimates
    pub dop: Option<DilutionOfPrecision>,
}

/// Session quality figures
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SessionQualityReport {
    /// Session position (ECEF m)
    pub position_m: Vector3<f64>,
    /// Horizontal precision (m)
    pub horizontal_m: f64,
    /// Vertical precision (m)
    pub vertical_m: f64,
    /// 95% confidence radius (m)
    pub confidence_95_m: f64,
    /// Session [DilutionOfPrecision]
    pub dop: DilutionOfPrecision,
    /// [SV]s that contributed to the stable window
    pub satellites: Vec<SV>,
    /// Number of epochs in the file
    pub epochs_processed: usize,
    /// Number of resolved epochs
    pub solutions: usize,
    /// Observation duration in hours
    pub observation_hours: f64,
    /// Fix rate (%)
    pub fix_rate: u8,
    /// Mean convergence fraction of the stable window
    pub mean_convergence: f64,
    /// [QualityTier]
    pub tier: QualityTier,
    /// Horizontal precision meets the accuracy standard
    pub compliant: bool,
}

impl SessionQualityReport {
    /// Number of distinct [SV]s used
    pub fn satellites_used(&self) -> usize {
        self.satellites.len()
    }

    /// Compliance verdict, as reported
    pub fn verdict(&self) -> &'static str {
        if self.compliant {
            "APROVADO"
        } else {
            "REPROCESSAR"
        }
    }
}

/// [SessionQualityClassifier] aggregates the [PositionEstimate]s of one session.
#[derive(Debug, Clone, Default)]
pub struct SessionQualityClassifier {
    opts: ClassifierOpts,
}

impl SessionQualityClassifier {
    pub fn new(opts: ClassifierOpts) -> Self {
        Self { opts }
    }

    /// Classifies this session. This never fails: without any
    /// [PositionEstimate], `fallback_m` is reported at the lowest tier.
    /// ## Input
    /// - estimates: chronological [PositionEstimate]s
    /// - model: [PrecisionModel] that derives convergence and precision figures
    /// - fallback_m: ECEF position (m) reported when no estimate exists
    /// - epochs_processed: number of parsed epochs
    /// - observation_hours: session duration
    pub fn classify(
        &self,
        estimates: &[PositionEstimate],
        model: &mut dyn PrecisionModel,
        fallback_m: &Vector3<f64>,
        epochs_processed: usize,
        observation_hours: f64,
    ) -> SessionQualityReport {
        if estimates.is_empty() {
            warn!("no valid solution: reporting approximate position");
            return self.no_solution(fallback_m, epochs_processed, observation_hours);
        }

        let convergences = estimates
            .iter()
            .enumerate()
            .map(|(i, estimate)| model.convergence(i, estimate))
            .collect::<Vec<_>>();

        let window_size = self.opts.stability_window.clamp(1, estimates.len());
        let start = estimates.len() - window_size;

        let window = &estimates[start..];
        let weights = &convergences[start..];

        let total_weight = weights.iter().sum::<f64>();
        let uniform = total_weight.is_nan() || total_weight <= 0.0;

        let (mut x, mut y, mut z) = (Averager::new(), Averager::new(), Averager::new());
        let mut convergence = Averager::new();
        let (mut h_sigma, mut v_sigma) = (Averager::new(), Averager::new());
        let (mut hdop, mut vdop) = (Averager::new(), Averager::new());

        for (estimate, weight) in window.iter().zip(weights.iter()) {
            let w = if uniform { 1.0 } else { *weight };
            x.add_weighted(estimate.pos_m[0], w);
            y.add_weighted(estimate.pos_m[1], w);
            z.add_weighted(estimate.pos_m[2], w);

            convergence.add(*weight);

            if !estimate.degraded && !estimate.dop.is_sentinel() {
                let rms_m = estimate.rms_residual_m();
                h_sigma.add(estimate.dop.hdop * rms_m);
                v_sigma.add(estimate.dop.vdop * rms_m);
                hdop.add(estimate.dop.hdop);
                vdop.add(estimate.dop.vdop);
            }
        }

        let position_m = Vector3::new(x.mean, y.mean, z.mean);
        let mean_convergence = convergence.mean;

        // mean PDOP is not the PDOP of mean components
        let dop = match (hdop.value(), vdop.value()) {
            (Some(hdop), Some(vdop)) => {
                Some(DilutionOfPrecision::from_horizontal_vertical(hdop, vdop))
            },
            _ => None,
        };

        let summary = WindowSummary {
            len: window.len(),
            mean_convergence,
            horizontal_sigma_m: h_sigma.value(),
            vertical_sigma_m: v_sigma.value(),
            dop,
        };

        let tier = QualityTier::from_convergence(mean_convergence);
        let assessment = model.assess(tier, &summary);

        let satellites = window
            .iter()
            .flat_map(|estimate| estimate.sv.iter().copied())
            .sorted()
            .dedup()
            .collect::<Vec<_>>();

        let fix_rate = (mean_convergence * 100.0 + 5.0).floor().clamp(0.0, 100.0) as u8;

        info!(
            "session: {} solutions, mean convergence {:.1}%, {}",
            estimates.len(),
            mean_convergence * 100.0,
            tier
        );

        SessionQualityReport {
            position_m,
            horizontal_m: assessment.horizontal_m,
            vertical_m: assessment.vertical_m,
            confidence_95_m: self.opts.confidence_factor * assessment.horizontal_m,
            dop: assessment.dop,
            satellites,
            epochs_processed,
            solutions: estimates.len(),
            observation_hours,
            fix_rate,
            mean_convergence,
            tier,
            compliant: assessment.horizontal_m < self.opts.accuracy_threshold_m,
        }
    }

    fn no_solution(
        &self,
        fallback_m: &Vector3<f64>,
        epochs_processed: usize,
        observation_hours: f64,
    ) -> SessionQualityReport {
        SessionQualityReport {
            position_m: *fallback_m,
            horizontal_m: NO_SOLUTION_SENTINEL,
            vertical_m: NO_SOLUTION_SENTINEL,
            confidence_95_m: NO_SOLUTION_SENTINEL,
            dop: DilutionOfPrecision {
                pdop: NO_SOLUTION_SENTINEL,
                hdop: NO_SOLUTION_SENTINEL,
                vdop: NO_SOLUTION_SENTINEL,
            },
            satellites: Vec::new(),
            epochs_processed,
            solutions: 0,
            observation_hours,
            fix_rate: 0,
            mean_convergence: 0.0,
            tier: QualityTier::NoSolution,
            compliant: false,
        }
    }
}
