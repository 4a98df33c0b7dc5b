use std::process::ExitCode;

use clap::Parser;
use vmc_samples_lib::cli::Cli;
use vmc_samples_lib::{commands, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.logging) {
        eprintln!("Error: {e}");
        return ExitCode::from(e.kind().exit_code());
    }

    match commands::run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(kind = %e.kind(), "run failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.kind().exit_code())
        }
    }
}
