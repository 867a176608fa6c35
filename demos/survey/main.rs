// Static survey example: processes one RINEX v2 observation file
// and prints the technical report.
//
// cargo run --example survey -- /path/to/file.24o --mode simulated --seed 42

#[macro_use]
extern crate log;

use env_logger::{Builder, Target};

mod cli;
use cli::Cli;

use gnss_survey::prelude::{ProcessingResult, Processor};

pub fn main() {
    // Traces are emitted through the log facade:
    // RUST_LOG=debug to see them all
    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stderr)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let cli = Cli::new();
    let path = cli.filepath();
    let cfg = cli.config();

    info!("{} precision, progress every {} epochs", cfg.precision, cfg.progress_interval);

    let processor = Processor::new(cfg);

    let result = processor.process_file_with_progress(path, |progress| {
        eprintln!(
            "{:>5.1}% ({}/{} epochs, {} solutions)",
            progress.fraction() * 100.0,
            progress.epochs_done,
            progress.epochs_total,
            progress.solutions
        );
    });

    match result {
        ProcessingResult::Success(report) => {
            println!("{}", report.technical_report);
            for issue in report.file_info.issues.iter() {
                println!("- {}", issue);
            }
            for recommendation in report.file_info.recommendations.iter() {
                println!("- {}", recommendation);
            }
        },
        ProcessingResult::Failure { message } => {
            error!("{}: {}", path, message);
            std::process::exit(1);
        },
    }
}
