use std::process::ExitCode;

use clap::Parser;
use client::config::DEFAULT_LOG_LEVEL;
use client::logging::init_tracing;
use client::{ClientConfig, Cli};
use tracing::{error, info};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = ClientConfig::load(&cli);
    init_tracing(
        config
            .as_ref()
            .map_or(DEFAULT_LOG_LEVEL, |config| config.log_level.as_str()),
    );

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            error!(action = "config", result = "fail", error = %err);
            return ExitCode::FAILURE;
        }
    };

    match client::run(&config) {
        Ok(summary) => {
            info!(
                action = "loop_finished",
                result = "success",
                client_id = %config.id,
                bets = summary.bets_sent,
                winners = %summary.winners.message
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(
                action = "loop_finished",
                result = "fail",
                client_id = %config.id,
                error = %format_args!("{err:#}")
            );
            ExitCode::FAILURE
        }
    }
}
