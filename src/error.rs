use thiserror::Error;

/// Fixed column parsing issues, local to one RINEX line.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ParsingError {
    #[error("line too short")]
    LineTooShort,

    #[error("not an epoch descriptor")]
    NotAnEpoch,

    #[error("invalid year field")]
    YearField,

    #[error("invalid month field")]
    MonthField,

    #[error("invalid day field")]
    DayField,

    #[error("invalid hours field")]
    HoursField,

    #[error("invalid minutes field")]
    MinutesField,

    #[error("invalid seconds field")]
    SecondsField,

    /// Fields parsed individually but do not describe a valid calendar date
    #[error("invalid calendar date")]
    CalendarDate,

    #[error("invalid epoch flag")]
    EpochFlag,

    #[error("invalid number of satellites")]
    NumSat,

    #[error("invalid satellite description")]
    SatelliteDescription,

    #[error("missing satellite continuation line")]
    MissingContinuation,

    #[error("invalid pseudo range field")]
    PseudoRange,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// None of the candidate encodings could decode the file, or the file
    /// could not be read at all. This is the only fatal error.
    #[error("failed to read file: {0}")]
    FileRead(String),

    /// `END OF HEADER` was not found within the scanning window.
    /// Body parsing then resumes at the fallback line.
    #[error("END OF HEADER not found within the first {0} lines")]
    HeaderParse(usize),

    /// Malformed fixed column record: the line is skipped.
    #[error("line {line}: {cause}")]
    EpochParse { line: usize, cause: ParsingError },

    /// Less than 4 usable observations: this epoch is discarded.
    #[error("not enough usable satellites ({0})")]
    InsufficientSatellites(usize),

    /// Degenerate geometry: (HᵗH) cannot be inverted.
    #[error("singular normal equations (degenerate geometry)")]
    SingularNormalEquations,

    /// No epoch of the session could be resolved.
    #[error("no valid solution for this session")]
    NoValidSolution,

    #[error("processing cancelled")]
    Cancelled,

    #[error("unknown encoding \"{0}\"")]
    UnknownEncoding(String),

    #[error("unknown precision mode \"{0}\"")]
    UnknownPrecisionMode(String),

    #[error("unknown quality classification \"{0}\"")]
    UnknownQualityTier(String),
}
