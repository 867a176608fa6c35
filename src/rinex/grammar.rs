//! RINEX v2 fixed column layout.
//!
//! Byte offsets are 0 based, ranges are end exclusive.
use std::ops::Range;

/// Header labels start at this (character) column
pub const HEADER_LABEL_COLUMN: usize = 60;

pub const RINEX_VERSION_TYPE: &str = "RINEX VERSION / TYPE";
pub const APPROX_POSITION_XYZ: &str = "APPROX POSITION XYZ";
pub const RECEIVER: &str = "REC # / TYPE / VERS";
pub const ANTENNA: &str = "ANT # / TYPE";
pub const MARKER_NAME: &str = "MARKER NAME";
pub const INTERVAL: &str = "INTERVAL";
pub const END_OF_HEADER: &str = "END OF HEADER";

/// Version field, in RINEX VERSION / TYPE
pub const VERSION: Range<usize> = 0..9;

/// 20 character fields, in REC # / TYPE / VERS and ANT # / TYPE
pub const HEADER_FIELD_WIDTH: usize = 20;

pub const YEAR: Range<usize> = 1..3;
pub const MONTH: Range<usize> = 4..6;
pub const DAY: Range<usize> = 7..9;
pub const HOURS: Range<usize> = 10..12;
pub const MINUTES: Range<usize> = 13..15;
pub const SECONDS: Range<usize> = 15..26;
pub const EPOCH_FLAG: Range<usize> = 26..29;
pub const NUMSAT: Range<usize> = 29..32;

/// Blank separators of the date fields
pub const DATE_SEPARATORS: [usize; 5] = [0, 3, 6, 9, 12];

/// First satellite ID, on epoch and continuation lines
pub const SV_LIST_START: usize = 32;
pub const SV_WIDTH: usize = 3;
pub const SV_PER_LINE: usize = 12;

/// Two digit years below this pivot belong to the 21st century
pub const YEAR_PIVOT: u16 = 80;

pub const PSEUDO_RANGE_C1: Range<usize> = 0..14;
pub const PHASE_RANGE_L1: Range<usize> = 14..28;
pub const SIGNAL_STRENGTH_S1: Range<usize> = 28..42;

/// Regular epoch
pub const FLAG_OK: u8 = 0;
/// Power failure occurred since the previous epoch
pub const FLAG_POWER_FAILURE: u8 = 1;
/// Cycle slip records follow
pub const FLAG_CYCLE_SLIP: u8 = 6;
/// Largest defined event flag
pub const FLAG_MAX: u8 = 6;

/// Returns the content of this column range, clipped to the line length.
/// Empty when out of bounds or not on a character boundary.
pub(crate) fn column(line: &str, range: Range<usize>) -> &str {
    let end = range.end.min(line.len());
    if range.start >= end {
        return "";
    }
    line.get(range.start..end).unwrap_or("")
}

/// Splits a header line into (content, label), at character column 60.
/// Lines shorter than that are entirely considered as label.
pub(crate) fn header_label(line: &str) -> (&str, &str) {
    match line.char_indices().nth(HEADER_LABEL_COLUMN) {
        Some((offset, _)) => (&line[..offset], &line[offset..]),
        None => ("", line),
    }
}
