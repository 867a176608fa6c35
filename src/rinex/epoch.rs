use std::{collections::BTreeMap, str::FromStr};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    error::ParsingError,
    prelude::{Constellation, Epoch, SV},
    rinex::grammar::{self, column},
};

/// Single frequency [Observation] of one [SV]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Observation {
    /// C1 pseudo range (m), always positive
    pub pseudorange_c1: f64,
    /// L1 phase range (cycles), when reported
    pub carrier_l1: Option<f64>,
    /// S1 signal strength (dB-Hz)
    pub signal_strength_s1: f64,
}

/// One observed instant
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RinexEpoch {
    /// Sampling [Epoch] (UTC)
    pub t: Epoch,
    /// Event flag
    pub flag: u8,
    /// [Observation]s per [SV]
    pub observations: BTreeMap<SV, Observation>,
}

impl RinexEpoch {
    /// [SV]s observed at this [Epoch]
    pub fn sv(&self) -> impl Iterator<Item = SV> + '_ {
        self.observations.keys().copied()
    }
}

/// Content of one epoch line
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EpochDescriptor {
    pub t: Epoch,
    pub flag: u8,
    pub numsat: usize,
    /// Up to 12 [SV]s listed on this very line
    pub sv: Vec<SV>,
}

impl EpochDescriptor {
    /// True when this record carries observations
    pub fn has_observations(&self) -> bool {
        carries_observations(self.flag)
    }
}

/// Event flags 2 to 5 introduce special records, not observations
fn carries_observations(flag: u8) -> bool {
    matches!(
        flag,
        grammar::FLAG_OK | grammar::FLAG_POWER_FAILURE | grammar::FLAG_CYCLE_SLIP
    )
}

/// Parses one 3 character satellite description.
/// A blank constellation means GPS.
pub(crate) fn parse_sv(desc: &str) -> Result<SV, ParsingError> {
    let mut chars = desc.chars();
    let letter = chars.next().ok_or(ParsingError::SatelliteDescription)?;

    let prn = chars
        .as_str()
        .trim()
        .parse::<u8>()
        .map_err(|_| ParsingError::SatelliteDescription)?;

    let constellation = if letter == ' ' {
        Constellation::GPS
    } else {
        Constellation::from_str(&letter.to_string())
            .map_err(|_| ParsingError::SatelliteDescription)?
    };

    Ok(SV::new(constellation, prn))
}

/// Parses the (up to 12) [SV]s listed on this line
fn parse_sv_list(line: &str, count: usize) -> Result<Vec<SV>, ParsingError> {
    (0..count.min(grammar::SV_PER_LINE))
        .map(|i| {
            let start = grammar::SV_LIST_START + i * grammar::SV_WIDTH;
            parse_sv(column(line, start..start + grammar::SV_WIDTH))
        })
        .collect()
}

fn parse_field<T: FromStr>(
    line: &str,
    range: std::ops::Range<usize>,
    err: ParsingError,
) -> Result<T, ParsingError> {
    column(line, range).trim().parse::<T>().map_err(|_| err)
}

/// Parses the timestamp, flag and satellite count of one epoch line.
pub(crate) fn parse_epoch_line(line: &str) -> Result<EpochDescriptor, ParsingError> {
    if line.len() < grammar::NUMSAT.end {
        return Err(ParsingError::LineTooShort);
    }

    let bytes = line.as_bytes();
    if grammar::DATE_SEPARATORS.iter().any(|i| bytes[*i] != b' ') {
        return Err(ParsingError::NotAnEpoch);
    }

    let year = parse_field::<u16>(line, grammar::YEAR, ParsingError::YearField)?;
    let month = parse_field::<u8>(line, grammar::MONTH, ParsingError::MonthField)?;
    let day = parse_field::<u8>(line, grammar::DAY, ParsingError::DayField)?;
    let hours = parse_field::<u8>(line, grammar::HOURS, ParsingError::HoursField)?;
    let mins = parse_field::<u8>(line, grammar::MINUTES, ParsingError::MinutesField)?;
    let secs = parse_field::<f64>(line, grammar::SECONDS, ParsingError::SecondsField)?;

    if !(1..=12).contains(&month) {
        return Err(ParsingError::MonthField);
    }
    if !(1..=31).contains(&day) {
        return Err(ParsingError::DayField);
    }
    if hours > 23 {
        return Err(ParsingError::HoursField);
    }
    if mins > 59 {
        return Err(ParsingError::MinutesField);
    }
    if !(0.0..61.0).contains(&secs) {
        return Err(ParsingError::SecondsField);
    }

    let year = if year < grammar::YEAR_PIVOT {
        2000 + year
    } else {
        1900 + year
    };

    let whole_secs = secs.trunc();
    let nanos = ((secs - whole_secs) * 1.0E9).round().min(999_999_999.0) as u32;

    let t = Epoch::maybe_from_gregorian_utc(
        i32::from(year),
        month,
        day,
        hours,
        mins,
        whole_secs as u8,
        nanos,
    )
    .map_err(|_| ParsingError::CalendarDate)?;

    let flag = parse_field::<u8>(line, grammar::EPOCH_FLAG, ParsingError::EpochFlag)?;
    if flag > grammar::FLAG_MAX {
        return Err(ParsingError::EpochFlag);
    }

    let numsat = parse_field::<usize>(line, grammar::NUMSAT, ParsingError::NumSat)?;

    let sv = if carries_observations(flag) {
        parse_sv_list(line, numsat)?
    } else {
        Vec::new()
    };

    Ok(EpochDescriptor {
        t,
        flag,
        numsat,
        sv,
    })
}

/// Parses one observation line. Returns `None` when this [SV]
/// does not have a usable pseudo range.
pub(crate) fn parse_observation(
    line: &str,
    default_snr_dbhz: f64,
) -> Result<Option<Observation>, ParsingError> {
    let c1 = column(line, grammar::PSEUDO_RANGE_C1).trim();
    if c1.is_empty() {
        return Ok(None);
    }

    let pseudorange_c1 = c1.parse::<f64>().map_err(|_| ParsingError::PseudoRange)?;
    if pseudorange_c1.is_nan() || pseudorange_c1 <= 0.0 {
        return Ok(None);
    }

    let carrier_l1 = column(line, grammar::PHASE_RANGE_L1)
        .trim()
        .parse::<f64>()
        .ok();

    let signal_strength_s1 = column(line, grammar::SIGNAL_STRENGTH_S1)
        .trim()
        .parse::<f64>()
        .unwrap_or(default_snr_dbhz);

    Ok(Some(Observation {
        pseudorange_c1,
        carrier_l1,
        signal_strength_s1,
    }))
}

/// One decoded epoch record
#[derive(Debug, Clone)]
pub(crate) struct Record {
    /// [RinexEpoch], when this record carried at least one usable [Observation]
    pub epoch: Option<RinexEpoch>,
    /// Every [SV] listed by this record
    pub listed: Vec<SV>,
    /// Number of lines this record spans
    pub consumed: usize,
}

/// Parses one epoch record, starting at `lines[0]`: the epoch line,
/// possible continuation lines, then one observation line per [SV].
/// Event records (flags 2 to 5) are skipped as a whole.
pub(crate) fn parse_record(lines: &[&str], default_snr_dbhz: f64) -> Result<Record, ParsingError> {
    let first = lines.first().ok_or(ParsingError::LineTooShort)?;
    let descriptor = parse_epoch_line(first)?;

    if !descriptor.has_observations() {
        return Ok(Record {
            epoch: None,
            listed: Vec::new(),
            consumed: (1 + descriptor.numsat).min(lines.len()),
        });
    }

    let mut listed = descriptor.sv;
    let mut consumed = 1;

    while listed.len() < descriptor.numsat {
        let line = lines
            .get(consumed)
            .ok_or(ParsingError::MissingContinuation)?;
        listed.extend(parse_sv_list(line, descriptor.numsat - listed.len())?);
        consumed += 1;
    }

    let mut observations = BTreeMap::new();

    for sv in listed.iter() {
        let Some(line) = lines.get(consumed) else {
            break;
        };
        consumed += 1;

        // one bad observation only discards this SV
        if let Ok(Some(observation)) = parse_observation(line, default_snr_dbhz) {
            observations.insert(*sv, observation);
        }
    }

    let epoch = if observations.is_empty() {
        None
    } else {
        Some(RinexEpoch {
            t: descriptor.t,
            flag: descriptor.flag,
            observations,
        })
    };

    Ok(Record {
        epoch,
        listed,
        consumed,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("G01", SV::new(Constellation::GPS, 1))]
    #[case("G 7", SV::new(Constellation::GPS, 7))]
    #[case(" 12", SV::new(Constellation::GPS, 12))]
    #[case("R24", SV::new(Constellation::Glonass, 24))]
    #[case("E11", SV::new(Constellation::Galileo, 11))]
    #[case("C05", SV::new(Constellation::BeiDou, 5))]
    fn sv_descriptions(#[case] desc: &str, #[case] expected: SV) {
        assert_eq!(parse_sv(desc), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("G")]
    #[case("GXX")]
    #[case("   ")]
    #[case("Z01")]
    fn invalid_sv_descriptions(#[case] desc: &str) {
        assert_eq!(parse_sv(desc), Err(ParsingError::SatelliteDescription));
    }

    #[test]
    fn epoch_line() {
        let line = " 23  7 24 20 57 15.5000000  0  4G24G11R28E05";
        let descriptor = parse_epoch_line(line).unwrap();
        assert_eq!(
            descriptor.t,
            Epoch::from_gregorian_utc(2023, 7, 24, 20, 57, 15, 500_000_000)
        );
        assert_eq!(descriptor.flag, 0);
        assert_eq!(descriptor.numsat, 4);
        assert_eq!(descriptor.sv.len(), 4);
        assert_eq!(descriptor.sv[2], SV::new(Constellation::Glonass, 28));
    }

    #[test]
    fn last_century() {
        let line = " 98 12 31 23 59 30.0000000  0  1G01";
        let descriptor = parse_epoch_line(line).unwrap();
        assert_eq!(
            descriptor.t,
            Epoch::from_gregorian_utc(1998, 12, 31, 23, 59, 30, 0)
        );
    }

    #[rstest]
    #[case(" 23  7 24 20 57", ParsingError::LineTooShort)]
    #[case("  20000000.123  105000000.123          45.000", ParsingError::NotAnEpoch)]
    #[case(" 23 13 24 20 57 15.0000000  0  4G24G11G28G05", ParsingError::MonthField)]
    #[case(" 23  7 32 20 57 15.0000000  0  4G24G11G28G05", ParsingError::DayField)]
    #[case(" 23  2 30 20 57 15.0000000  0  4G24G11G28G05", ParsingError::CalendarDate)]
    #[case(" 23  7 24 25 57 15.0000000  0  4G24G11G28G05", ParsingError::HoursField)]
    #[case(" 23  7 24 20 57 1x.0000000  0  4G24G11G28G05", ParsingError::SecondsField)]
    #[case(" 23  7 24 20 57 15.0000000  9  4G24G11G28G05", ParsingError::EpochFlag)]
    #[case(" 23  7 24 20 57 15.0000000  0  xG24G11G28G05", ParsingError::NumSat)]
    #[case(" 23  7 24 20 57 15.0000000  0  4G24G11G28", ParsingError::SatelliteDescription)]
    fn invalid_epoch_lines(#[case] line: &str, #[case] expected: ParsingError) {
        assert_eq!(parse_epoch_line(line), Err(expected));
    }

    #[test]
    fn observation_lines() {
        let line = format!("{:14.5}{:14.4}{:14.5}", 20000000.12345, 105000000.1234, 42.0);
        let obs = parse_observation(&line, 45.0).unwrap().unwrap();
        assert_eq!(obs.pseudorange_c1, 20000000.12345);
        assert_eq!(obs.carrier_l1, Some(105000000.1234));
        assert_eq!(obs.signal_strength_s1, 42.0);

        let obs = parse_observation("  20000000.123", 45.0).unwrap().unwrap();
        assert_eq!(obs.pseudorange_c1, 20000000.123);
        assert!(obs.carrier_l1.is_none());
        assert_eq!(obs.signal_strength_s1, 45.0);

        assert_eq!(parse_observation("", 45.0), Ok(None));
        assert_eq!(parse_observation("        -1.000", 45.0), Ok(None));
        assert_eq!(
            parse_observation("  2000x000.123", 45.0),
            Err(ParsingError::PseudoRange)
        );
    }

    #[test]
    fn event_records() {
        let lines = [
            " 23  7 24 20 57 15.0000000  4  2",
            "                                                            COMMENT",
            "                                                            COMMENT",
            " 23  7 24 20 57 30.0000000  0  1G01",
        ];
        let record = parse_record(&lines, 45.0).unwrap();
        assert!(record.epoch.is_none());
        assert_eq!(record.consumed, 3);
    }

    #[test]
    fn record_with_rejected_observations() {
        let lines = [
            " 23  7 24 20 57 15.0000000  0  3G01G02G03",
            "20000000.12345",
            "",
            "  2000x000.12345",
        ];
        let record = parse_record(&lines, 45.0).unwrap();
        assert_eq!(record.consumed, 4);
        assert_eq!(record.listed.len(), 3);
        let epoch = record.epoch.unwrap();
        assert_eq!(epoch.observations.len(), 1);
        assert!(epoch
            .observations
            .contains_key(&SV::new(Constellation::GPS, 1)));
    }

    #[test]
    fn missing_continuation() {
        let lines = [" 23  7 24 20 57 15.0000000  0 13G01G02G03G04G05G06G07G08G09G10G11G12"];
        assert_eq!(
            parse_record(&lines, 45.0).unwrap_err(),
            ParsingError::MissingContinuation
        );
    }
}
