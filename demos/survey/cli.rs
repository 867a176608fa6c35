// The Cli selects the input file and the precision model.
use clap::{value_parser, Arg, ArgAction, ColorChoice, Command};
use std::str::FromStr;

use gnss_survey::prelude::{Config, PrecisionMode};

pub struct Cli {
    filepath: String,
    cfg: Config,
}

impl Cli {
    pub fn new() -> Self {
        let cmd = Command::new("survey")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Static survey of one RINEX v2 observation file")
            .arg_required_else_help(true)
            .color(ColorChoice::Always)
            .arg(
                Arg::new("filepath")
                    .action(ArgAction::Set)
                    .required(true)
                    .help("RINEX v2 observation file"),
            )
            .arg(
                Arg::new("mode")
                    .short('m')
                    .long("mode")
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(PrecisionMode::from_str)
                    .help("Precision model: deterministic (default) or simulated (not geodetic grade)"),
            )
            .arg(
                Arg::new("seed")
                    .short('s')
                    .long("seed")
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(u64))
                    .help("Seed of the simulated precision model (Optional)"),
            )
            .arg(
                Arg::new("progress-interval")
                    .short('p')
                    .long("progress-interval")
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(usize))
                    .help("Report progress every so many epochs (Optional)"),
            );

        let matches = cmd.get_matches();

        let filepath = matches
            .get_one::<String>("filepath")
            .cloned()
            .unwrap_or_default();

        let seed = matches.get_one::<u64>("seed").copied();

        let mut cfg = match matches.get_one::<PrecisionMode>("mode") {
            Some(PrecisionMode::Simulated) => Config::demo_preset(seed),
            _ => Config::survey_preset(),
        };

        if let Some(interval) = matches.get_one::<usize>("progress-interval") {
            cfg = cfg.with_progress_interval(*interval);
        }

        Self { filepath, cfg }
    }
    pub fn filepath(&self) -> &str {
        &self.filepath
    }
    pub fn config(&self) -> Config {
        self.cfg.clone()
    }
}
