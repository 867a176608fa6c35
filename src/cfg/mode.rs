use crate::prelude::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Selects how session precision figures are derived
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrecisionMode {
    /// Precision derived from post-fit residuals and dilution of precision,
    /// of actual least squares solutions. Reproducible.
    #[default]
    Deterministic,

    /// Demonstration mode: the multi-epoch convergence is synthesized
    /// from an exponential decay with random perturbation. Figures
    /// are not reproducible (unless seeded) and not geodetic grade.
    Simulated,
}

impl std::fmt::Display for PrecisionMode {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Deterministic => write!(fmt, "deterministic"),
            Self::Simulated => write!(fmt, "simulated"),
        }
    }
}

impl std::str::FromStr for PrecisionMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deterministic" | "solver" => Ok(Self::Deterministic),
            "simulated" | "simulation" | "demo" => Ok(Self::Simulated),
            other => Err(Error::UnknownPrecisionMode(other.to_string())),
        }
    }
}
