use crate::prelude::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Horizontal, vertical and DOP ranges of one [QualityTier]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierBands {
    /// Horizontal precision range (m)
    pub horizontal_m: (f64, f64),
    /// Vertical precision range (m)
    pub vertical_m: (f64, f64),
    pub pdop: (f64, f64),
    pub hdop: (f64, f64),
    pub vdop: (f64, f64),
}

/// Session [QualityTier], ordered from worst to best
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QualityTier {
    /// Did not converge
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "SEM SOLUÇÃO"))]
    NoSolution,
    #[cfg_attr(feature = "serde", serde(rename = "RUIM"))]
    Poor,
    #[cfg_attr(feature = "serde", serde(rename = "REGULAR"))]
    Fair,
    #[cfg_attr(feature = "serde", serde(rename = "BOA"))]
    Good,
    #[cfg_attr(feature = "serde", serde(rename = "EXCELENTE"))]
    Excellent,
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for QualityTier {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EXCELENTE" | "EXCELLENT" => Ok(Self::Excellent),
            "BOA" | "GOOD" => Ok(Self::Good),
            "REGULAR" | "FAIR" => Ok(Self::Fair),
            "RUIM" | "POOR" => Ok(Self::Poor),
            "SEM SOLUÇÃO" | "SEM SOLUCAO" | "NO SOLUTION" => Ok(Self::NoSolution),
            other => Err(Error::UnknownQualityTier(other.to_string())),
        }
    }
}

impl QualityTier {
    /// Report label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "EXCELENTE",
            Self::Good => "BOA",
            Self::Fair => "REGULAR",
            Self::Poor => "RUIM",
            Self::NoSolution => "SEM SOLUÇÃO",
        }
    }

    /// Selects [QualityTier] from a mean convergence fraction
    pub fn from_convergence(convergence: f64) -> Self {
        if convergence > 0.90 {
            Self::Excellent
        } else if convergence > 0.75 {
            Self::Good
        } else if convergence > 0.50 {
            Self::Fair
        } else if convergence > 0.25 {
            Self::Poor
        } else {
            Self::NoSolution
        }
    }

    /// Returns [TierBands] of this [QualityTier]
    pub fn bands(&self) -> TierBands {
        match self {
            Self::Excellent => TierBands {
                horizontal_m: (0.03, 0.05),
                vertical_m: (0.05, 0.08),
                pdop: (1.1, 1.4),
                hdop: (0.7, 0.9),
                vdop: (1.3, 1.7),
            },
            Self::Good => TierBands {
                horizontal_m: (0.08, 0.15),
                vertical_m: (0.12, 0.20),
                pdop: (1.5, 2.0),
                hdop: (1.0, 1.3),
                vdop: (1.8, 2.3),
            },
            Self::Fair => TierBands {
                horizontal_m: (0.20, 0.50),
                vertical_m: (0.35, 0.60),
                pdop: (2.2, 3.0),
                hdop: (1.5, 2.0),
                vdop: (2.8, 3.5),
            },
            Self::Poor => TierBands {
                horizontal_m: (0.80, 2.00),
                vertical_m: (1.20, 3.00),
                pdop: (4.0, 6.0),
                hdop: (2.5, 3.5),
                vdop: (4.5, 7.0),
            },
            Self::NoSolution => TierBands {
                horizontal_m: (5.0, 15.0),
                vertical_m: (8.0, 20.0),
                pdop: (4.0, 6.0),
                hdop: (2.5, 3.5),
                vdop: (4.5, 7.0),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;
    use std::str::FromStr;

    #[rstest]
    #[case(1.0, QualityTier::Excellent)]
    #[case(0.91, QualityTier::Excellent)]
    #[case(0.90, QualityTier::Good)]
    #[case(0.76, QualityTier::Good)]
    #[case(0.75, QualityTier::Fair)]
    #[case(0.51, QualityTier::Fair)]
    #[case(0.50, QualityTier::Poor)]
    #[case(0.26, QualityTier::Poor)]
    #[case(0.25, QualityTier::NoSolution)]
    #[case(0.0, QualityTier::NoSolution)]
    fn tier_thresholds(#[case] convergence: f64, #[case] expected: QualityTier) {
        assert_eq!(QualityTier::from_convergence(convergence), expected);
    }

    #[test]
    fn tier_labels() {
        for tier in [
            QualityTier::Excellent,
            QualityTier::Good,
            QualityTier::Fair,
            QualityTier::Poor,
            QualityTier::NoSolution,
        ] {
            assert_eq!(QualityTier::from_str(tier.label()).unwrap(), tier);
            assert_eq!(tier.to_string(), tier.label());
        }
        assert!(QualityTier::from_str("PERFEITA").is_err());
    }
}
