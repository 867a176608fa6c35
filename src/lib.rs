#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod averager;
mod bias;
mod cfg;
mod constants;
mod coords;
mod error;
mod navigation;
mod orbit;
mod processing;
mod quality;
mod rinex;
mod solver;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::bias::ExponentialTroposphere;
    pub use crate::cfg::{
        ClassifierOpts, Config, Encoding, Modeling, ParserOpts, PrecisionMode, SolverOpts,
    };
    pub use crate::coords::{
        ecef_to_geodetic, geodetic_to_ecef, geodetic_to_utm, utm_to_geodetic,
        GeodeticCoordinate, Hemisphere, UtmCoordinate,
    };
    pub use crate::error::{Error, ParsingError};
    pub use crate::navigation::{DilutionOfPrecision, PositionEstimate};
    pub use crate::orbit::{CircularOrbitModel, OrbitSource, OrbitalFamily, SatellitePosition};
    pub use crate::processing::{
        CancellationToken, Cartesian, Coordinates, FileInfo, FileStatus, Precision,
        ProcessingDetails, ProcessingReport, ProcessingResult, Processor, Progress, Quality,
    };
    pub use crate::quality::{
        DeterministicPrecision, PrecisionAssessment, PrecisionModel, QualityTier,
        SessionQualityClassifier, SessionQualityReport, SimulatedPrecision, TierBands,
        WindowSummary,
    };
    pub use crate::rinex::{Header, Observation, RinexEpoch, RinexParser, RinexRecord};
    pub use crate::solver::{PositioningSolver, SolverState};
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}

// pub export
pub use error::Error;
