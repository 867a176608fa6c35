#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    cfg::Encoding,
    prelude::{Vector3, SV},
    rinex::RinexRecord,
};

/// Minimal number of satellites for a position fix
const MIN_SATELLITES: usize = 4;

/// Number of satellites recommended for high precision
const RECOMMENDED_SATELLITES: usize = 6;

/// Shortest usable session (h)
const MIN_DURATION_H: f64 = 1.0;

/// Session length recommended for georeferencing (h)
const RECOMMENDED_DURATION_H: f64 = 2.0;

/// Longest expected session (h)
const MAX_DURATION_H: f64 = 24.0;

/// Observation file status, prior to any processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum FileStatus {
    #[cfg_attr(feature = "serde", serde(rename = "EXCELENTE"))]
    Excellent,
    #[cfg_attr(feature = "serde", serde(rename = "BOA"))]
    Good,
    #[cfg_attr(feature = "serde", serde(rename = "RUIM"))]
    Poor,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "EXCELENTE"),
            Self::Good => write!(f, "BOA"),
            Self::Poor => write!(f, "RUIM"),
        }
    }
}

impl FileStatus {
    fn from_issues(issues: usize) -> Self {
        match issues {
            0 => Self::Excellent,
            1..=2 => Self::Good,
            _ => Self::Poor,
        }
    }
}

/// Observation file summary
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FileInfo {
    /// Number of distinct satellites
    pub satellites_count: usize,
    /// Distinct satellites, sorted
    pub satellites: Vec<SV>,
    /// Observation duration (h)
    pub duration_hours: f64,
    /// Number of parsed epochs
    pub epochs: usize,
    pub rinex_version: Option<String>,
    pub receiver: Option<String>,
    pub antenna: Option<String>,
    pub marker_name: Option<String>,
    /// Header approximate position (ECEF m)
    pub approx_position_m: Option<Vector3<f64>>,
    /// [Encoding] the file was decoded with
    pub encoding: Option<Encoding>,
    /// Body was truncated by the line ceiling
    pub truncated: bool,
    /// [FileStatus]
    pub quality_status: FileStatus,
    /// Issues, as reported
    pub issues: Vec<String>,
    /// Recommendations, as reported
    pub recommendations: Vec<String>,
}

impl FileInfo {
    /// Summarizes this [RinexRecord]
    pub fn new(record: &RinexRecord) -> Self {
        let satellites_count = record.satellites.len();
        let duration_hours = record.duration_hours();

        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        if satellites_count < MIN_SATELLITES {
            issues.push(format!(
                "Número insuficiente de satélites ({} < {})",
                satellites_count, MIN_SATELLITES
            ));
        }

        if duration_hours < MIN_DURATION_H {
            issues.push(format!(
                "Tempo de observação curto ({:.2}h < 1h)",
                duration_hours
            ));
        } else if duration_hours > MAX_DURATION_H {
            issues.push(format!(
                "Tempo de observação muito longo ({:.2}h > 24h)",
                duration_hours
            ));
        }

        if satellites_count < RECOMMENDED_SATELLITES {
            recommendations.push("Recomenda-se 6+ satélites para alta precisão".to_string());
        }

        if duration_hours < RECOMMENDED_DURATION_H {
            recommendations.push("Recomenda-se 2+ horas para georreferenciamento".to_string());
        }

        if issues.is_empty() {
            recommendations.push("Dados adequados para processamento PPP".to_string());
        }

        Self {
            satellites_count,
            satellites: record.satellites.clone(),
            duration_hours,
            epochs: record.epoch_count(),
            rinex_version: record.header.version.clone(),
            receiver: record.header.receiver(),
            antenna: record.header.antenna(),
            marker_name: record.header.marker_name.clone(),
            approx_position_m: record.header.approx_position_m,
            encoding: record.encoding,
            truncated: record.truncated,
            quality_status: FileStatus::from_issues(issues.len()),
            issues,
            recommendations,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::prelude::{Constellation, Duration};
    use rstest::*;

    fn record(nb_sv: u8, hours: f64) -> RinexRecord {
        RinexRecord {
            satellites: (1..=nb_sv)
                .map(|prn| SV::new(Constellation::GPS, prn))
                .collect(),
            duration: Duration::from_seconds(hours * 3600.0),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(8, 3.0, FileStatus::Excellent, 0)]
    #[case(5, 3.0, FileStatus::Excellent, 0)]
    #[case(3, 3.0, FileStatus::Good, 1)]
    #[case(8, 0.5, FileStatus::Good, 1)]
    #[case(8, 30.0, FileStatus::Good, 1)]
    #[case(3, 0.5, FileStatus::Good, 2)]
    fn file_status(
        #[case] nb_sv: u8,
        #[case] hours: f64,
        #[case] status: FileStatus,
        #[case] nb_issues: usize,
    ) {
        let info = FileInfo::new(&record(nb_sv, hours));
        assert_eq!(info.quality_status, status);
        assert_eq!(info.issues.len(), nb_issues);
        assert_eq!(info.satellites_count, nb_sv as usize);
    }

    #[test]
    fn recommendations() {
        let info = FileInfo::new(&record(5, 1.5));
        assert_eq!(
            info.recommendations,
            vec![
                "Recomenda-se 6+ satélites para alta precisão",
                "Recomenda-se 2+ horas para georreferenciamento",
                "Dados adequados para processamento PPP",
            ]
        );

        let info = FileInfo::new(&record(3, 0.25));
        assert_eq!(info.issues[0], "Número insuficiente de satélites (3 < 4)");
        assert_eq!(info.issues[1], "Tempo de observação curto (0.25h < 1h)");
        assert!(!info
            .recommendations
            .iter()
            .any(|r| r.contains("PPP")));
    }
}
