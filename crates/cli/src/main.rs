//! AQI Pipeline - Main Entry Point

use aqi_cli::{execute, init_logging, Command, Settings, USAGE};
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };
    if command == Command::Help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings.logging);

    info!("=== AQI Pipeline v{} ===", env!("CARGO_PKG_VERSION"));
    settings.log_summary();

    match execute(command, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
