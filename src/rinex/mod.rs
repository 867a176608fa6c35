//! RINEX v2 observation files.
use std::collections::BTreeSet;

use log::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    cfg::{Encoding, ParserOpts},
    prelude::{Duration, Epoch, Error, SV},
};

mod epoch;
pub(crate) mod grammar;
mod header;

pub use epoch::{Observation, RinexEpoch};
pub use header::Header;

/// Decoded RINEX file
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RinexRecord {
    /// [Header] fields
    pub header: Header,
    /// [Encoding] that decoded this file
    pub encoding: Option<Encoding>,
    /// [RinexEpoch]s in chronological order
    pub epochs: Vec<RinexEpoch>,
    /// First sampling [Epoch]
    pub first_epoch: Option<Epoch>,
    /// Last sampling [Epoch], possibly beyond [Self::epochs] when truncated
    pub last_epoch: Option<Epoch>,
    /// Session [Duration]
    pub duration: Duration,
    /// Every [SV] listed in the observation records, sorted
    pub satellites: Vec<SV>,
    /// Number of body lines visited
    pub lines_scanned: usize,
    /// Number of malformed lines that were skipped
    pub rejected_lines: usize,
    /// The body was larger than the line ceiling and
    /// [Self::epochs] only covers the first part.
    pub truncated: bool,
}

impl Default for RinexRecord {
    fn default() -> Self {
        Self {
            header: Header::default(),
            encoding: None,
            epochs: Vec::new(),
            first_epoch: None,
            last_epoch: None,
            duration: Duration::ZERO,
            satellites: Vec::new(),
            lines_scanned: 0,
            rejected_lines: 0,
            truncated: false,
        }
    }
}

impl RinexRecord {
    /// Number of [RinexEpoch]s
    pub fn epoch_count(&self) -> usize {
        self.epochs.len()
    }

    /// Session duration in hours
    pub fn duration_hours(&self) -> f64 {
        self.duration.to_seconds() / 3600.0
    }
}

/// [RinexParser] decodes RINEX v2 observation files
#[derive(Debug, Clone, Default)]
pub struct RinexParser {
    opts: ParserOpts,
}

impl RinexParser {
    pub fn new(opts: ParserOpts) -> Self {
        Self { opts }
    }

    /// Tries each candidate [Encoding], in order, until one decodes the content.
    pub fn decode(&self, bytes: &[u8]) -> Result<(Encoding, String), Error> {
        for encoding in self.opts.encodings.iter() {
            if let Some(content) = encoding.decode(bytes) {
                debug!("file decoded as {}", encoding);
                return Ok((*encoding, content));
            }
            debug!("failed to decode file as {}", encoding);
        }
        Err(Error::FileRead(format!(
            "no candidate encoding ({}) could decode this file",
            self.opts
                .encodings
                .iter()
                .map(|enc| enc.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    /// Decodes and parses raw file content.
    /// Fails only when no candidate [Encoding] matches.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<RinexRecord, Error> {
        let (encoding, content) = self.decode(bytes)?;
        let mut record = self.parse_str(&content);
        record.encoding = Some(encoding);
        Ok(record)
    }

    /// Parses decoded content. Malformed lines are skipped,
    /// this never fails.
    pub fn parse_str(&self, content: &str) -> RinexRecord {
        let lines = content.lines().collect::<Vec<_>>();

        let header = header::Header::parse(&lines, self.opts.header_scan_lines);

        let body_start = match header.end_of_header {
            Some(end) => end + 1,
            None => {
                let e = Error::HeaderParse(self.opts.header_scan_lines);
                warn!("{}: resuming at line {}", e, self.opts.fallback_body_line + 1);
                self.opts.fallback_body_line
            },
        };

        let body_end = lines.len().min(body_start.saturating_add(self.opts.max_lines));
        let truncated = body_end < lines.len();

        let mut epochs = Vec::<RinexEpoch>::new();
        let mut satellites = BTreeSet::<SV>::new();
        let mut rejected_lines = 0;

        let mut i = body_start;

        while i < body_end {
            let line = lines[i];
            if line.trim().is_empty() {
                i += 1;
                continue;
            }

            match epoch::parse_record(&lines[i..], self.opts.default_snr_dbhz) {
                Ok(record) => {
                    satellites.extend(record.listed.iter().copied());
                    if let Some(epoch) = record.epoch {
                        if epochs.is_empty() {
                            info!("{} : first epoch, {} satellites", epoch.t, record.listed.len());
                        }
                        epochs.push(epoch);
                    }
                    i += record.consumed.max(1);
                },
                Err(cause) => {
                    let e = Error::EpochParse { line: i + 1, cause };
                    debug!("{}", e);
                    rejected_lines += 1;
                    i += 1;
                },
            }
        }

        let lines_scanned = body_end.saturating_sub(body_start);

        let first_epoch = epochs.first().map(|epoch| epoch.t);
        let mut last_epoch = epochs.last().map(|epoch| epoch.t);

        if truncated {
            warn!(
                "body truncated to {} lines: {} epochs decoded",
                self.opts.max_lines,
                epochs.len()
            );
            let scan_end = lines
                .len()
                .min(body_start.saturating_add(self.opts.max_duration_scan_lines));

            if let Some(t) = Self::last_timestamp(&lines[body_end.min(scan_end)..scan_end]) {
                last_epoch = Some(t);
            }
        }

        let duration = match (first_epoch, last_epoch) {
            (Some(first), Some(last)) => last - first,
            _ => {
                let interval_s = header
                    .interval_s
                    .unwrap_or(self.opts.default_interval_s);
                Duration::from_seconds(epochs.len() as f64 * interval_s)
            },
        };

        info!(
            "{} epochs, {} satellites, {:.2}h",
            epochs.len(),
            satellites.len(),
            duration.to_seconds() / 3600.0
        );

        RinexRecord {
            header,
            encoding: None,
            epochs,
            first_epoch,
            last_epoch,
            duration,
            satellites: satellites.into_iter().collect(),
            lines_scanned,
            rejected_lines,
            truncated,
        }
    }

    /// Timestamp only pass: returns the last valid epoch timestamp.
    fn last_timestamp(lines: &[&str]) -> Option<Epoch> {
        lines
            .iter()
            .rev()
            .find_map(|line| epoch::parse_epoch_line(line).ok())
            .map(|descriptor| descriptor.t)
    }
}
