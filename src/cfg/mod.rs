#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::CONTINENTAL_DEFAULT_ECEF_M;

mod encoding;
mod mode;

pub use encoding::Encoding;
pub use mode::PrecisionMode;

fn default_encodings() -> Vec<Encoding> {
    vec![
        Encoding::Utf8,
        Encoding::Latin1,
        Encoding::Ascii,
        Encoding::Cp1252,
    ]
}

fn default_header_scan_lines() -> usize {
    50
}

fn default_fallback_body_line() -> usize {
    13
}

fn default_max_lines() -> usize {
    2_000_000
}

fn default_max_duration_scan_lines() -> usize {
    20_000_000
}

fn default_interval_s() -> f64 {
    30.0
}

fn default_snr_dbhz() -> f64 {
    45.0
}

fn default_min_snr() -> f64 {
    30.0
}

fn default_min_sv() -> usize {
    4
}

fn default_max_iterations() -> usize {
    10
}

fn default_convergence_m() -> f64 {
    1.0E-3
}

fn default_tropo() -> bool {
    true
}

fn default_earth_rot() -> bool {
    true
}

fn default_stability_window() -> usize {
    100
}

fn default_accuracy_threshold_m() -> f64 {
    0.50
}

fn default_confidence_factor() -> f64 {
    1.96
}

fn default_reference_sigma_m() -> f64 {
    0.5
}

fn default_progress_interval() -> usize {
    100
}

fn default_position() -> (f64, f64, f64) {
    CONTINENTAL_DEFAULT_ECEF_M
}

/// RINEX decoding and scanning options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParserOpts {
    /// Candidate [Encoding]s, tried in order until one decodes the file.
    #[cfg_attr(feature = "serde", serde(default = "default_encodings"))]
    pub encodings: Vec<Encoding>,
    /// Number of leading lines scanned for header fields.
    #[cfg_attr(feature = "serde", serde(default = "default_header_scan_lines"))]
    pub header_scan_lines: usize,
    /// Body parsing resumes at this line (0 based) when
    /// `END OF HEADER` could not be located.
    #[cfg_attr(feature = "serde", serde(default = "default_fallback_body_line"))]
    pub fallback_body_line: usize,
    /// Ceiling on the number of body lines decoded into epochs.
    /// Keeps the worst case latency predictable on large files.
    #[cfg_attr(feature = "serde", serde(default = "default_max_lines"))]
    pub max_lines: usize,
    /// Ceiling on the number of lines visited by the timestamp only
    /// pass, when the body was truncated by [Self::max_lines].
    #[cfg_attr(feature = "serde", serde(default = "default_max_duration_scan_lines"))]
    pub max_duration_scan_lines: usize,
    /// Sampling interval (s) assumed when the header does not define one.
    #[cfg_attr(feature = "serde", serde(default = "default_interval_s"))]
    pub default_interval_s: f64,
    /// Signal strength (dB-Hz) assumed when S1 is blank.
    #[cfg_attr(feature = "serde", serde(default = "default_snr_dbhz"))]
    pub default_snr_dbhz: f64,
}

impl Default for ParserOpts {
    fn default() -> Self {
        Self {
            encodings: default_encodings(),
            header_scan_lines: default_header_scan_lines(),
            fallback_body_line: default_fallback_body_line(),
            max_lines: default_max_lines(),
            max_duration_scan_lines: default_max_duration_scan_lines(),
            default_interval_s: default_interval_s(),
            default_snr_dbhz: default_snr_dbhz(),
        }
    }
}

/// Least squares solver options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverOpts {
    /// Minimal signal strength (dB-Hz), strictly exceeded, for one
    /// observation to contribute.
    #[cfg_attr(feature = "serde", serde(default = "default_min_snr"))]
    pub min_snr: f64,
    /// Minimal number of usable satellites.
    #[cfg_attr(feature = "serde", serde(default = "default_min_sv"))]
    pub min_sv: usize,
    /// Maximal number of linearized iterations, per epoch.
    #[cfg_attr(feature = "serde", serde(default = "default_max_iterations"))]
    pub max_iterations: usize,
    /// Iteration stops once the position correction norm (m) falls below this.
    #[cfg_attr(feature = "serde", serde(default = "default_convergence_m"))]
    pub convergence_m: f64,
}

impl Default for SolverOpts {
    fn default() -> Self {
        Self {
            min_snr: default_min_snr(),
            min_sv: default_min_sv(),
            max_iterations: default_max_iterations(),
            convergence_m: default_convergence_m(),
        }
    }
}

/// Physical modeling
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Modeling {
    /// Compensate for troposphere delay (+/- 2.3m at sea level)
    #[cfg_attr(feature = "serde", serde(default = "default_tropo"))]
    pub tropo_delay: bool,
    /// Rotate satellite positions into the Earth fixed frame
    #[cfg_attr(feature = "serde", serde(default = "default_earth_rot"))]
    pub earth_rotation: bool,
}

impl Default for Modeling {
    fn default() -> Self {
        Self {
            tropo_delay: default_tropo(),
            earth_rotation: default_earth_rot(),
        }
    }
}

impl Modeling {
    /// Disables all physical modeling
    pub fn no_modeling() -> Self {
        Self {
            tropo_delay: false,
            earth_rotation: false,
        }
    }
}

/// Session classification options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassifierOpts {
    /// Number of most recent estimates forming the stable window.
    #[cfg_attr(feature = "serde", serde(default = "default_stability_window"))]
    pub stability_window: usize,
    /// Horizontal precision (m) below which a session is compliant
    /// with the survey / georeferencing standard.
    #[cfg_attr(feature = "serde", serde(default = "default_accuracy_threshold_m"))]
    pub accuracy_threshold_m: f64,
    /// Horizontal precision multiplier, for the 95% confidence radius.
    #[cfg_attr(feature = "serde", serde(default = "default_confidence_factor"))]
    pub confidence_factor: f64,
    /// Reference error (m) used to derive a convergence fraction
    /// from solver residuals.
    #[cfg_attr(feature = "serde", serde(default = "default_reference_sigma_m"))]
    pub reference_sigma_m: f64,
}

impl Default for ClassifierOpts {
    fn default() -> Self {
        Self {
            stability_window: default_stability_window(),
            accuracy_threshold_m: default_accuracy_threshold_m(),
            confidence_factor: default_confidence_factor(),
            reference_sigma_m: default_reference_sigma_m(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// RINEX decoding options
    #[cfg_attr(feature = "serde", serde(default))]
    pub parser: ParserOpts,
    /// Solver options
    #[cfg_attr(feature = "serde", serde(default))]
    pub solver: SolverOpts,
    /// Physical [Modeling]
    #[cfg_attr(feature = "serde", serde(default))]
    pub modeling: Modeling,
    /// Session classification options
    #[cfg_attr(feature = "serde", serde(default))]
    pub classifier: ClassifierOpts,
    /// [PrecisionMode] selects how precision figures are derived.
    #[cfg_attr(feature = "serde", serde(default))]
    pub precision: PrecisionMode,
    /// Seed of the simulated precision model. Random when not defined.
    #[cfg_attr(feature = "serde", serde(default))]
    pub simulation_seed: Option<u64>,
    /// Progress is reported every so many epochs.
    #[cfg_attr(feature = "serde", serde(default = "default_progress_interval"))]
    pub progress_interval: usize,
    /// ECEF (m) position used when the header does not provide one.
    #[cfg_attr(feature = "serde", serde(default = "default_position"))]
    pub default_position_ecef_m: (f64, f64, f64),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parser: ParserOpts::default(),
            solver: SolverOpts::default(),
            modeling: Modeling::default(),
            classifier: ClassifierOpts::default(),
            precision: PrecisionMode::default(),
            simulation_seed: None,
            progress_interval: default_progress_interval(),
            default_position_ecef_m: default_position(),
        }
    }
}

impl Config {
    /// Returns [Config] for static surveys, with solver derived precision.
    /// You can then customize [Self] as you will.
    pub fn survey_preset() -> Self {
        Self::default()
    }

    /// Returns [Config] for demonstrations: precision figures are
    /// simulated and must not be used for certification.
    pub fn demo_preset(seed: Option<u64>) -> Self {
        let mut s = Self::default();
        s.precision = PrecisionMode::Simulated;
        s.simulation_seed = seed;
        s
    }

    /// Copies and returns [Self] with updated [Modeling]
    pub fn with_modeling(&self, modeling: Modeling) -> Self {
        let mut s = self.clone();
        s.modeling = modeling;
        s
    }

    /// Copies and returns [Self] with updated [ParserOpts]
    pub fn with_parser(&self, parser: ParserOpts) -> Self {
        let mut s = self.clone();
        s.parser = parser;
        s
    }

    /// Copies and returns [Self] with updated [SolverOpts]
    pub fn with_solver(&self, solver: SolverOpts) -> Self {
        let mut s = self.clone();
        s.solver = solver;
        s
    }

    /// Copies and returns [Self] with updated progress interval (in epochs)
    pub fn with_progress_interval(&self, interval: usize) -> Self {
        let mut s = self.clone();
        s.progress_interval = interval;
        s
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.parser.header_scan_lines, 50);
        assert_eq!(cfg.parser.encodings.len(), 4);
        assert_eq!(cfg.parser.encodings[0], Encoding::Utf8);
        assert_eq!(cfg.solver.min_sv, 4);
        assert_eq!(cfg.solver.max_iterations, 10);
        assert_eq!(cfg.classifier.stability_window, 100);
        assert_eq!(cfg.precision, PrecisionMode::Deterministic);
        assert!(cfg.modeling.tropo_delay);
    }

    #[test]
    fn demo_preset() {
        let cfg = Config::demo_preset(Some(7));
        assert_eq!(cfg.precision, PrecisionMode::Simulated);
        assert_eq!(cfg.simulation_seed, Some(7));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_config() {
        let content = r#"{
            "solver": { "min_snr": 35.0 },
            "modeling": { "tropo_delay": false },
            "precision": "Simulated"
        }"#;
        let cfg: Config = serde_json::from_str(content).unwrap();
        assert_eq!(cfg.solver.min_snr, 35.0);
        assert_eq!(cfg.solver.max_iterations, 10);
        assert!(!cfg.modeling.tropo_delay);
        assert!(cfg.modeling.earth_rotation);
        assert_eq!(cfg.precision, PrecisionMode::Simulated);
        assert_eq!(cfg.parser.header_scan_lines, 50);
    }
}
