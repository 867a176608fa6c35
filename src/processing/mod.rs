//! Top level pipeline: RINEX decoding, epoch wise positioning,
//! session classification and reporting.
use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use log::{error, info, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    cfg::{Config, PrecisionMode},
    coords::{ecef_to_geodetic, geodetic_to_utm, UtmCoordinate},
    orbit::CircularOrbitModel,
    prelude::{Duration, Error, Vector3},
    quality::{
        DeterministicPrecision, PrecisionModel, QualityTier, SessionQualityClassifier,
        SessionQualityReport, SimulatedPrecision,
    },
    rinex::{RinexParser, RinexRecord},
    solver::{PositioningSolver, SolverState},
};

mod file_info;
mod report;
mod tracer;

pub use file_info::{FileInfo, FileStatus};

use tracer::Tracer;

/// Cooperative [CancellationToken], checked between epochs.
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Requests cancellation of the ongoing (or next) processing
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clears a previous cancellation request
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// [Progress] report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Number of epochs processed so far
    pub epochs_done: usize,
    /// Total number of epochs
    pub epochs_total: usize,
    /// Number of [crate::prelude::PositionEstimate]s so far
    pub solutions: usize,
}

impl Progress {
    /// Completion ratio, within [0, 1]
    pub fn fraction(&self) -> f64 {
        if self.epochs_total == 0 {
            1.0
        } else {
            self.epochs_done as f64 / self.epochs_total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.epochs_done >= self.epochs_total
    }
}

/// Session coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Coordinates {
    /// Latitude (ddeg)
    pub latitude: f64,
    /// Longitude (ddeg)
    pub longitude: f64,
    /// Ellipsoidal height (m)
    pub altitude: f64,
    pub utm: UtmCoordinate,
}

/// Session ECEF coordinates (m)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Cartesian {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Session precision figures
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Precision {
    /// Horizontal precision (m)
    pub horizontal: f64,
    /// Vertical precision (m)
    pub vertical: f64,
    pub pdop: f64,
    pub hdop: f64,
    pub vdop: f64,
    /// 95% confidence radius (m)
    pub confidence_95: f64,
}

/// Session quality figures
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Quality {
    pub classification: QualityTier,
    pub satellites_used: usize,
    pub epochs_processed: usize,
    pub observation_hours: f64,
    /// Fix rate (%)
    pub fix_rate: u8,
    /// Horizontal precision meets the accuracy standard
    pub compliant: bool,
}

/// How the session was processed
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ProcessingDetails {
    pub method: String,
    pub datum: String,
    /// Corrections that were actually modeled
    pub corrections_applied: Vec<String>,
    /// Processing [Duration]
    pub processing_time: Duration,
    pub epochs_per_second: f64,
    /// [PrecisionMode] that produced the precision figures
    pub precision_mode: PrecisionMode,
    /// Number of [crate::prelude::PositionEstimate]s
    pub solutions: usize,
    /// Number of epochs that could not be resolved
    pub rejected: usize,
    /// Number of estimates obtained from a degenerate geometry
    pub degraded: usize,
}

/// Structured [ProcessingReport]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ProcessingReport {
    pub coordinates: Coordinates,
    pub cartesian: Cartesian,
    pub precision: Precision,
    pub quality: Quality,
    pub file_info: FileInfo,
    pub processing_details: ProcessingDetails,
    /// Human readable technical report
    pub technical_report: String,
}

impl ProcessingReport {
    /// Compliance verdict, as reported
    pub fn verdict(&self) -> &'static str {
        if self.quality.compliant {
            "APROVADO"
        } else {
            "REPROCESSAR"
        }
    }

    fn new(
        session: &SessionQualityReport,
        file_info: FileInfo,
        processing_details: ProcessingDetails,
    ) -> Self {
        let geo = ecef_to_geodetic(&session.position_m);
        let utm = geodetic_to_utm(&geo);

        let mut report = Self {
            coordinates: Coordinates {
                latitude: geo.lat_deg,
                longitude: geo.lon_deg,
                altitude: geo.alt_m,
                utm,
            },
            cartesian: Cartesian {
                x: session.position_m[0],
                y: session.position_m[1],
                z: session.position_m[2],
            },
            precision: Precision {
                horizontal: session.horizontal_m,
                vertical: session.vertical_m,
                pdop: session.dop.pdop,
                hdop: session.dop.hdop,
                vdop: session.dop.vdop,
                confidence_95: session.confidence_95_m,
            },
            quality: Quality {
                classification: session.tier,
                satellites_used: session.satellites_used(),
                epochs_processed: session.epochs_processed,
                observation_hours: session.observation_hours,
                fix_rate: session.fix_rate,
                compliant: session.compliant,
            },
            file_info,
            processing_details,
            technical_report: String::new(),
        };

        report.technical_report = report::technical_report(&report);
        report
    }
}

/// Outcome of one [Processor] invocation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "status"))]
pub enum ProcessingResult {
    Success(Box<ProcessingReport>),
    Failure {
        /// User safe description
        message: String,
    },
}

impl From<Result<ProcessingReport, Error>> for ProcessingResult {
    fn from(result: Result<ProcessingReport, Error>) -> Self {
        match result {
            Ok(report) => Self::Success(Box::new(report)),
            Err(e) => Self::Failure {
                message: e.to_string(),
            },
        }
    }
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns [ProcessingReport] on success
    pub fn report(&self) -> Option<&ProcessingReport> {
        match self {
            Self::Success(report) => Some(report),
            Self::Failure { .. } => None,
        }
    }

    /// Returns failure message
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { message } => Some(message),
        }
    }
}

/// [Processor] runs the complete pipeline over one observation file.
/// Each invocation owns its working state: one [Processor] may process
/// many files, sequentially or from different threads.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    /// [Config]
    cfg: Config,
    /// [CancellationToken]
    cancel: CancellationToken,
}

impl Processor {
    /// Creates new [Processor]
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            cancel: CancellationToken::default(),
        }
    }

    /// Returns [Config] in use
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns a [CancellationToken] bound to this [Processor].
    /// Once cancelled, every following processing fails with
    /// [Error::Cancelled] until [CancellationToken::reset] is called.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Processes the file located at `path`.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> ProcessingResult {
        self.process_file_with_progress(path, |_| {})
    }

    /// Processes the file located at `path`, reporting [Progress] along the way.
    pub fn process_file_with_progress<P: AsRef<Path>, F: FnMut(Progress)>(
        &self,
        path: P,
        progress: F,
    ) -> ProcessingResult {
        let path = path.as_ref();
        let result = std::fs::read(path)
            .map_err(|e| Error::FileRead(format!("{}: {}", path.display(), e)))
            .and_then(|bytes| self.try_process(&bytes, progress));

        if let Err(e) = &result {
            error!("{}: {}", path.display(), e);
        }

        result.into()
    }

    /// Processes raw file content.
    pub fn process_bytes(&self, bytes: &[u8]) -> ProcessingResult {
        self.process_bytes_with_progress(bytes, |_| {})
    }

    /// Processes raw file content, reporting [Progress] along the way.
    pub fn process_bytes_with_progress<F: FnMut(Progress)>(
        &self,
        bytes: &[u8],
        progress: F,
    ) -> ProcessingResult {
        let result = self.try_process(bytes, progress);
        if let Err(e) = &result {
            error!("{}", e);
        }
        result.into()
    }

    /// Processes raw file content.
    /// ## Input
    /// - bytes: raw file content
    /// - progress: invoked every [Config::progress_interval] epochs, and once on completion
    /// ## Returns
    /// - [ProcessingReport]. A session without any solution is still reported,
    ///   at the [QualityTier::NoSolution] tier.
    /// - [Error::FileRead] when the content could not be decoded
    /// - [Error::Cancelled] when cancelled through the [CancellationToken]
    pub fn try_process<F: FnMut(Progress)>(
        &self,
        bytes: &[u8],
        mut progress: F,
    ) -> Result<ProcessingReport, Error> {
        let t0 = Instant::now();

        let parser = RinexParser::new(self.cfg.parser.clone());
        let record = parser.parse_bytes(bytes)?;

        let apriori_m = self.apriori(&record);
        let epochs_total = record.epoch_count();

        let orbit = CircularOrbitModel::new(self.cfg.modeling.earth_rotation);
        let solver = PositioningSolver::new(self.cfg.solver, self.cfg.modeling, &orbit);

        let mut simulated = match self.cfg.precision {
            PrecisionMode::Deterministic => None,
            PrecisionMode::Simulated => {
                warn!("simulated precision: figures are not geodetic grade");
                Some(SimulatedPrecision::new(self.cfg.simulation_seed))
            },
        };

        let mut state = SolverState::new(apriori_m);
        let mut tracer = Tracer::default();

        for (index, epoch) in record.epochs.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("{} : cancelled after {} epochs", epoch.t, index);
                return Err(Error::Cancelled);
            }

            match simulated.as_mut() {
                Some(model) => {
                    let estimate = model.synthesize_epoch(index, epoch, &apriori_m);
                    state.estimates.push(estimate);
                },
                None => {
                    state = solver.fold(state, epoch);
                    match (&state.last_error, state.estimates.last()) {
                        (Some(e), _) => tracer.rejection(epoch.t, e),
                        (None, Some(estimate)) => tracer.solution(estimate),
                        (None, None) => {},
                    }
                },
            }

            let epochs_done = index + 1;

            if self.cfg.progress_interval > 0
                && epochs_done % self.cfg.progress_interval == 0
                && epochs_done < epochs_total
            {
                progress(Progress {
                    epochs_done,
                    epochs_total,
                    solutions: state.estimates.len(),
                });
            }
        }

        progress(Progress {
            epochs_done: epochs_total,
            epochs_total,
            solutions: state.estimates.len(),
        });

        if state.estimates.is_empty() {
            warn!("{}", Error::NoValidSolution);
        }

        let classifier = SessionQualityClassifier::new(self.cfg.classifier);
        let mut deterministic = DeterministicPrecision::new(self.cfg.classifier.reference_sigma_m);

        let model: &mut dyn PrecisionModel = match simulated.as_mut() {
            Some(model) => model,
            None => &mut deterministic,
        };

        let session = classifier.classify(
            &state.estimates,
            model,
            &apriori_m,
            epochs_total,
            record.duration_hours(),
        );

        let elapsed_s = t0.elapsed().as_secs_f64();

        let details = ProcessingDetails {
            method: self.method().to_string(),
            datum: "WGS84".to_string(),
            corrections_applied: self.corrections(),
            processing_time: Duration::from_seconds(elapsed_s),
            epochs_per_second: if elapsed_s > 0.0 {
                epochs_total as f64 / elapsed_s
            } else {
                0.0
            },
            precision_mode: self.cfg.precision,
            solutions: state.estimates.len(),
            rejected: state.rejected,
            degraded: state.degraded(),
        };

        info!(
            "{} epochs processed in {:.3}s: {} solutions, {} rejected, {}",
            epochs_total, elapsed_s, details.solutions, details.rejected, session.tier
        );

        Ok(ProcessingReport::new(
            &session,
            FileInfo::new(&record),
            details,
        ))
    }

    /// A priori position: header position when defined, configured default otherwise
    fn apriori(&self, record: &RinexRecord) -> Vector3<f64> {
        match record.header.approx_position_m {
            Some(position) => position,
            None => {
                let (x, y, z) = self.cfg.default_position_ecef_m;
                info!("no approximate position in header: using default ({}, {}, {})", x, y, z);
                Vector3::new(x, y, z)
            },
        }
    }

    fn method(&self) -> &'static str {
        match self.cfg.precision {
            PrecisionMode::Deterministic => "Single Point Positioning com correções",
            PrecisionMode::Simulated => "Single Point Positioning (precisão simulada)",
        }
    }

    fn corrections(&self) -> Vec<String> {
        let mut corrections = Vec::new();
        if self.cfg.modeling.tropo_delay {
            corrections.push("troposfera".to_string());
        }
        if self.cfg.modeling.earth_rotation {
            corrections.push("rotação da Terra".to_string());
        }
        corrections.push("relógio do receptor".to_string());
        corrections
    }
}
