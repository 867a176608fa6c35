use log::{debug, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{prelude::Vector3, rinex::grammar};

/// RINEX [Header] fields we are interested in.
/// Everything is optional: a missing field is never an error.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Header {
    /// Revision, as described in RINEX VERSION / TYPE
    pub version: Option<String>,
    /// ECEF (m) approximate marker position
    pub approx_position_m: Option<Vector3<f64>>,
    /// Receiver serial number
    pub receiver_number: Option<String>,
    /// Receiver model
    pub receiver_type: Option<String>,
    /// Receiver firmware version
    pub receiver_firmware: Option<String>,
    /// Antenna serial number
    pub antenna_number: Option<String>,
    /// Antenna model
    pub antenna_type: Option<String>,
    pub marker_name: Option<String>,
    /// Sampling interval (s)
    pub interval_s: Option<f64>,
    /// Line index (0 based) of END OF HEADER
    pub end_of_header: Option<usize>,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Splits content into consecutive 20 character fields
fn fixed_fields(content: &str) -> Vec<Option<String>> {
    let chars = content.chars().collect::<Vec<_>>();
    chars
        .chunks(grammar::HEADER_FIELD_WIDTH)
        .map(|chunk| non_empty(&chunk.iter().collect::<String>()))
        .collect()
}

impl Header {
    /// Scans up to `max_lines` leading lines for header fields.
    /// Scanning stops at END OF HEADER.
    pub(crate) fn parse(lines: &[&str], max_lines: usize) -> Self {
        let mut header = Self::default();

        for (i, line) in lines.iter().take(max_lines).enumerate() {
            let (content, label) = grammar::header_label(line);

            if label.contains(grammar::END_OF_HEADER) {
                header.end_of_header = Some(i);
                break;
            } else if label.contains(grammar::RINEX_VERSION_TYPE) {
                header.version = non_empty(&content.chars().take(grammar::VERSION.end).collect::<String>());
            } else if label.contains(grammar::APPROX_POSITION_XYZ) {
                let coords = content
                    .split_ascii_whitespace()
                    .take(3)
                    .filter_map(|item| item.parse::<f64>().ok())
                    .collect::<Vec<_>>();

                if coords.len() == 3 {
                    header.approx_position_m = Some(Vector3::new(coords[0], coords[1], coords[2]));
                } else {
                    warn!("line {}: invalid approximate position", i + 1);
                }
            } else if label.contains(grammar::RECEIVER) {
                let mut fields = fixed_fields(content).into_iter();
                header.receiver_number = fields.next().flatten();
                header.receiver_type = fields.next().flatten();
                header.receiver_firmware = fields.next().flatten();
            } else if label.contains(grammar::ANTENNA) {
                let mut fields = fixed_fields(content).into_iter();
                header.antenna_number = fields.next().flatten();
                header.antenna_type = fields.next().flatten();
            } else if label.contains(grammar::MARKER_NAME) {
                header.marker_name = non_empty(content);
            } else if label.contains(grammar::INTERVAL) {
                match content.trim().parse::<f64>() {
                    Ok(interval) if interval > 0.0 => header.interval_s = Some(interval),
                    _ => warn!("line {}: invalid interval", i + 1),
                }
            }
        }

        if let Some(version) = &header.version {
            debug!("RINEX revision {}", version);
        }
        if let Some(apriori) = &header.approx_position_m {
            debug!(
                "approximate position x={:.3}m y={:.3}m z={:.3}m",
                apriori[0], apriori[1], apriori[2]
            );
        }

        header
    }

    /// Receiver description, as reported to the user
    pub fn receiver(&self) -> Option<String> {
        match (&self.receiver_type, &self.receiver_number) {
            (Some(model), Some(number)) => Some(format!("{} #{}", model, number)),
            (Some(model), None) => Some(model.clone()),
            (None, number) => number.clone(),
        }
    }

    /// Antenna description, as reported to the user
    pub fn antenna(&self) -> Option<String> {
        match (&self.antenna_type, &self.antenna_number) {
            (Some(model), Some(number)) => Some(format!("{} #{}", model, number)),
            (Some(model), None) => Some(model.clone()),
            (None, number) => number.clone(),
        }
    }
}
