//! Synthetic RINEX v2 observation files
use crate::prelude::{
    CircularOrbitModel, Constellation, Epoch, ExponentialTroposphere, GeodeticCoordinate,
    OrbitSource, Vector3, SV,
};

/// São Paulo (Brazil) reference site: (lat ddeg, lon ddeg, alt m)
pub const SAO_PAULO: (f64, f64, f64) = (-23.5505, -46.6333, 760.0);

/// Receiver clock bias used by synthetic ranges (m)
pub const CLOCK_BIAS_M: f64 = 1234.5;

/// Default signal strength of synthetic observations (dB-Hz)
pub const SNR_DBHZ: f64 = 45.0;

pub fn gps(prn: u8) -> SV {
    SV::new(Constellation::GPS, prn)
}

/// Reference site, in ECEF (m)
pub fn sao_paulo_ecef_m() -> Vector3<f64> {
    let (lat, lon, alt) = SAO_PAULO;
    GeodeticCoordinate::new(lat, lon, alt).to_ecef()
}

/// `n`-th sampling instant, 30s apart, starting 2024-03-01 00:00:00 UTC
pub fn sampling_epoch(n: usize) -> Epoch {
    let secs = n * 30;
    Epoch::from_gregorian_utc(
        2024,
        3,
        1,
        (secs / 3600) as u8,
        ((secs / 60) % 60) as u8,
        (secs % 60) as u8,
        0,
    )
}

/// Zero noise pseudo range (m) observed at `rx_m`, with [CLOCK_BIAS_M],
/// optional exponential troposphere delay at the receiver altitude.
pub fn synthetic_range_m(sv: SV, t: Epoch, rx_m: &Vector3<f64>, tropo: bool) -> f64 {
    let orbit = CircularOrbitModel::default();
    let sat = orbit
        .position(sv, t)
        .unwrap_or_else(|| panic!("no orbit for {}", sv));

    let mut range_m = sat.range_m(rx_m) + CLOCK_BIAS_M;

    if tropo {
        let alt_m = GeodeticCoordinate::from_ecef(rx_m).alt_m;
        range_m += ExponentialTroposphere::default().delay_m(alt_m);
    }

    range_m
}

fn constellation_letter(constellation: Constellation) -> char {
    match constellation {
        Constellation::Glonass => 'R',
        Constellation::Galileo => 'E',
        Constellation::BeiDou => 'C',
        Constellation::QZSS => 'J',
        Constellation::SBAS => 'S',
        Constellation::IRNSS => 'I',
        _ => 'G',
    }
}

pub fn header_line(content: &str, label: &str) -> String {
    format!("{:<60}{}", content, label)
}

/// One synthetic observation: [SV], pseudo range (m), signal strength (dB-Hz)
pub type SyntheticObservation = (SV, f64, f64);

/// Builds RINEX v2 observation file content
#[derive(Debug, Clone)]
pub struct RinexBuilder {
    approx_position_m: Option<Vector3<f64>>,
    marker_name: String,
    interval_s: Option<f64>,
    end_of_header: bool,
    body: Vec<String>,
}

impl Default for RinexBuilder {
    fn default() -> Self {
        Self {
            approx_position_m: None,
            marker_name: "SPBR".to_string(),
            interval_s: Some(30.0),
            end_of_header: true,
            body: Vec::new(),
        }
    }
}

impl RinexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_approx_position(mut self, position_m: Vector3<f64>) -> Self {
        self.approx_position_m = Some(position_m);
        self
    }

    pub fn with_marker_name(mut self, name: &str) -> Self {
        self.marker_name = name.to_string();
        self
    }

    pub fn without_interval(mut self) -> Self {
        self.interval_s = None;
        self
    }

    pub fn without_end_of_header(mut self) -> Self {
        self.end_of_header = false;
        self
    }

    /// Appends raw body line
    pub fn raw(mut self, line: &str) -> Self {
        self.body.push(line.to_string());
        self
    }

    /// Appends one epoch record, with flag 0
    pub fn epoch(self, t: Epoch, observations: &[SyntheticObservation]) -> Self {
        self.epoch_with_flag(t, 0, observations)
    }

    /// Appends one epoch record. Satellites beyond 12 go to continuation lines.
    pub fn epoch_with_flag(
        mut self,
        t: Epoch,
        flag: u8,
        observations: &[SyntheticObservation],
    ) -> Self {
        let (y, m, d, hh, mm, ss, ns) = t.to_gregorian_utc();
        let secs = f64::from(ss) + f64::from(ns) * 1.0E-9;

        let mut line = format!(
            " {:02} {:2} {:2} {:2} {:2}{:11.7}{:3}{:3}",
            y % 100,
            m,
            d,
            hh,
            mm,
            secs,
            flag,
            observations.len()
        );

        for (i, (sv, _, _)) in observations.iter().enumerate() {
            if i > 0 && i % 12 == 0 {
                self.body.push(line);
                line = " ".repeat(32);
            }
            line.push_str(&format!(
                "{}{:02}",
                constellation_letter(sv.constellation),
                sv.prn
            ));
        }
        self.body.push(line);

        for (_, pr, snr) in observations.iter() {
            self.body
                .push(format!("{:14.5}{:14}{:14.3}", pr, "", snr));
        }

        self
    }

    /// Header lines: always 13 lines, the body starts at line 13 (0 based)
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = vec![
            header_line(
                "     2.11           OBSERVATION DATA    M (MIXED)",
                "RINEX VERSION / TYPE",
            ),
            header_line("synthetic           gnss-survey", "PGM / RUN BY / DATE"),
            header_line(&self.marker_name, "MARKER NAME"),
            header_line("SPBR", "MARKER NUMBER"),
            header_line("surveyor            agency", "OBSERVER / AGENCY"),
            header_line(
                "5217K80001          TRIMBLE R10         5.45",
                "REC # / TYPE / VERS",
            ),
            header_line("1440930475          TRM57971.00     NONE", "ANT # / TYPE"),
        ];

        lines.push(match self.approx_position_m {
            Some(pos) => header_line(
                &format!("{:14.4}{:14.4}{:14.4}", pos[0], pos[1], pos[2]),
                "APPROX POSITION XYZ",
            ),
            None => header_line("", "COMMENT"),
        });

        lines.push(header_line(
            "        0.0000        0.0000        0.0000",
            "ANTENNA: DELTA H/E/N",
        ));
        lines.push(header_line("     1     1", "WAVELENGTH FACT L1/2"));
        lines.push(header_line("     3    C1    L1    S1", "# / TYPES OF OBSERV"));

        lines.push(match self.interval_s {
            Some(interval) => header_line(&format!("{:10.3}", interval), "INTERVAL"),
            None => header_line("", "COMMENT"),
        });

        if self.end_of_header {
            lines.push(header_line("", "END OF HEADER"));
        } else {
            lines.push(header_line("", "COMMENT"));
        }

        lines
    }

    /// Builds the file content
    pub fn build(&self) -> String {
        let mut lines = self.header_lines();
        lines.extend(self.body.iter().cloned());
        lines.join("\n") + "\n"
    }
}

/// Session observed from the reference site: `nb_epochs` epochs,
/// each observing every [SV] of `sv`, zero noise ranges.
pub fn reference_session(nb_epochs: usize, sv: &[SV], tropo: bool) -> RinexBuilder {
    let rx_m = sao_paulo_ecef_m();

    // a few km off
    let approx_m = rx_m + Vector3::new(3_000.0, -2_000.0, 1_500.0);

    (0..nb_epochs).fold(
        RinexBuilder::new().with_approx_position(approx_m),
        |builder, n| {
            let t = sampling_epoch(n);
            let observations = sv
                .iter()
                .map(|sv| (*sv, synthetic_range_m(*sv, t, &rx_m, tropo), SNR_DBHZ))
                .collect::<Vec<_>>();
            builder.epoch(t, &observations)
        },
    )
}
