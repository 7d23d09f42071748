//! Agency client for the lottery server.
//!
//! Resolves settings from defaults, `config.yaml`, the environment and the
//! command line, then drives a [`session::ClientSession`] over TCP.
//!
//! # Design Principles
//!
//! - **Layered configuration** - Each source only fills what the one above it
//!   left unset; see [`config`].
//! - **Thin binary** - `main` wires config, logging and the session together;
//!   everything it calls lives here and is tested here.

pub mod config;
pub mod logging;

use anyhow::{Context, Result};
use session::{
    BetSource, ClientSession, CsvSource, RepeatSource, SessionSummary, TcpConnector, UploadMode,
};
use tracing::info;

pub use config::{ClientConfig, Cli, ConfigError};

/// Builds the record source for the configured mode.
///
/// Batch mode reads the bets file; single mode repeats the configured bet
/// `loop_amount` times.
pub fn open_source(config: &ClientConfig) -> Result<Box<dyn BetSource>> {
    match config.mode {
        UploadMode::Batch => {
            let source = CsvSource::open(&config.bets_file, config.id.as_str())
                .with_context(|| format!("open bets file {}", config.bets_file.display()))?;
            Ok(Box::new(source))
        }
        UploadMode::Single => {
            let bet = config
                .single_bet
                .clone()
                .context("single mode needs a configured bet")?;
            Ok(Box::new(RepeatSource::new(bet, config.loop_amount)))
        }
    }
}

/// Runs one full session against the configured server.
pub fn run(config: &ClientConfig) -> Result<SessionSummary> {
    info!(
        action = "config",
        result = "success",
        client_id = %config.id,
        server_address = %config.server_address,
        loop_amount = config.loop_amount,
        loop_period = ?config.loop_period,
        batch_max_amount = config.batch_max_amount,
        mode = ?config.mode,
        log_level = %config.log_level
    );

    let mut source = open_source(config)?;
    let connector = TcpConnector::new(config.server_address.as_str());
    let mut session =
        ClientSession::new(config.session_config(), connector).context("create session")?;
    let summary = session.run(&mut source).context("run session")?;
    Ok(summary)
}
