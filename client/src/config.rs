//! Client configuration with layered overrides.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. YAML file (`config.yaml`, or the path given with `--config`)
//! 3. Environment variables (`CLI_*`, plus the single-bet fields)
//! 4. Command-line flags
//!
//! Environment and flags are both read by clap, which already prefers a
//! flag over its variable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use message::BetRecord;
use serde::Deserialize;
use session::{SessionConfig, UploadMode, DEFAULT_LOOP_PERIOD};
use tracing::level_filters::LevelFilter;

/// File read when `--config` is not given. A missing default file is fine.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_BETS_FILE: &str = "/data/agency.csv";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOOP_AMOUNT: usize = 5;

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid period {value:?}: {reason}")]
    InvalidPeriod { value: String, reason: String },

    #[error("invalid log level {value:?}")]
    InvalidLogLevel { value: String },

    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("`{0}` must be at least 1")]
    Zero(&'static str),
}

/// Upload mode as spelled on the command line and in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Batch,
    Single,
}

impl From<Mode> for UploadMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Batch => Self::Batch,
            Mode::Single => Self::Single,
        }
    }
}

/// Command-line flags and their environment variables.
#[derive(Parser, Debug, Default)]
#[command(
    name = "quiniela-client",
    version,
    about = "Uploads an agency's bets and waits for the lottery winners"
)]
pub struct Cli {
    /// YAML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Agency id.
    #[arg(long, env = "CLI_ID")]
    pub id: Option<String>,

    /// Server address (`host:port`).
    #[arg(long, env = "CLI_SERVER_ADDRESS")]
    pub server_address: Option<String>,

    /// Pause between batches and winner polls (`250ms`, `5s`, `1m30s`).
    #[arg(long, env = "CLI_LOOP_PERIOD")]
    pub loop_period: Option<String>,

    /// Times the single bet is sent in single mode.
    #[arg(long, env = "CLI_LOOP_AMOUNT")]
    pub loop_amount: Option<usize>,

    /// Maximum bets per batch (capped at 80).
    #[arg(long, env = "CLI_BATCH_MAXAMOUNT")]
    pub batch_max_amount: Option<usize>,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, env = "CLI_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Agency bets file (CSV).
    #[arg(long, env = "CLI_BETS_FILE")]
    pub bets_file: Option<PathBuf>,

    #[arg(long, value_enum, env = "CLI_MODE")]
    pub mode: Option<Mode>,

    #[arg(long, env = "NOMBRE")]
    pub first_name: Option<String>,

    #[arg(long, env = "APELLIDO")]
    pub last_name: Option<String>,

    #[arg(long, env = "DOCUMENTO")]
    pub document: Option<String>,

    #[arg(long, env = "NACIMIENTO")]
    pub birthdate: Option<String>,

    #[arg(long, env = "NUMERO")]
    pub number: Option<String>,
}

/// A period written either as text with a unit or as plain milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PeriodValue {
    Millis(u64),
    Text(String),
}

impl PeriodValue {
    fn to_duration(&self) -> Result<Duration, ConfigError> {
        match self {
            Self::Millis(ms) => Ok(Duration::from_millis(*ms)),
            Self::Text(text) => parse_period(text),
        }
    }
}

/// The YAML file, every key optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub id: Option<String>,
    pub server: ServerSection,
    #[serde(rename = "loop")]
    pub loop_section: LoopSection,
    pub batch: BatchSection,
    pub log: LogSection,
    pub bets_file: Option<PathBuf>,
    pub mode: Option<Mode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoopSection {
    pub amount: Option<usize>,
    pub period: Option<PeriodValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatchSection {
    #[serde(rename = "maxAmount")]
    pub max_amount: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: Option<String>,
}

impl FileConfig {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`; a missing file is an error.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Reads `path`, treating a missing file as empty.
    pub fn read_optional(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Fully resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub id: String,
    pub server_address: String,
    pub loop_period: Duration,
    pub loop_amount: usize,
    pub batch_max_amount: usize,
    pub log_level: String,
    pub bets_file: PathBuf,
    pub mode: UploadMode,
    /// The record repeated in single mode.
    pub single_bet: Option<BetRecord>,
}

impl ClientConfig {
    /// Reads the config file named by `cli` (or the default one) and applies
    /// the flag and environment overrides on top.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::read_optional(Path::new(DEFAULT_CONFIG_PATH))?,
        };
        Self::resolve(file, cli)
    }

    /// Merges `file` under `cli` and validates the result.
    pub fn resolve(file: FileConfig, cli: &Cli) -> Result<Self, ConfigError> {
        let id = cli.id.clone().or(file.id).unwrap_or_default();
        let server_address = cli
            .server_address
            .clone()
            .or(file.server.address)
            .unwrap_or_default();

        let loop_period = match &cli.loop_period {
            Some(text) => parse_period(text)?,
            None => file
                .loop_section
                .period
                .as_ref()
                .map(PeriodValue::to_duration)
                .transpose()?
                .unwrap_or(DEFAULT_LOOP_PERIOD),
        };
        let loop_amount = cli
            .loop_amount
            .or(file.loop_section.amount)
            .unwrap_or(DEFAULT_LOOP_AMOUNT);
        let batch_max_amount = cli
            .batch_max_amount
            .or(file.batch.max_amount)
            .unwrap_or(message::PROTOCOL_MAX_BATCH_SIZE);
        let log_level = cli
            .log_level
            .clone()
            .or(file.log.level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned())
            .to_ascii_lowercase();
        let bets_file = cli
            .bets_file
            .clone()
            .or(file.bets_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BETS_FILE));
        let mode: UploadMode = cli.mode.or(file.mode).unwrap_or(Mode::Batch).into();

        let single_bet = match mode {
            UploadMode::Single => Some(single_bet(&id, cli)?),
            UploadMode::Batch => None,
        };

        let config = Self {
            id,
            server_address,
            loop_period,
            loop_amount,
            batch_max_amount,
            log_level,
            bets_file,
            mode,
            single_bet,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::Missing("id"));
        }
        if self.server_address.trim().is_empty() {
            return Err(ConfigError::Missing("server.address"));
        }
        if self.batch_max_amount == 0 {
            return Err(ConfigError::Zero("batch.maxAmount"));
        }
        if self.mode == UploadMode::Single && self.loop_amount == 0 {
            return Err(ConfigError::Zero("loop.amount"));
        }
        if LevelFilter::from_str(&self.log_level).is_err() {
            return Err(ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            });
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.id.as_str())
            .with_loop_period(self.loop_period)
            .with_batch_max_amount(self.batch_max_amount)
            .with_upload_mode(self.mode)
    }
}

fn single_bet(agency: &str, cli: &Cli) -> Result<BetRecord, ConfigError> {
    fn required<'a>(value: Option<&'a String>, name: &'static str) -> Result<&'a str, ConfigError> {
        value
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(name))
    }

    Ok(BetRecord::new(
        agency,
        required(cli.first_name.as_ref(), "NOMBRE")?,
        required(cli.last_name.as_ref(), "APELLIDO")?,
        required(cli.document.as_ref(), "DOCUMENTO")?,
        required(cli.birthdate.as_ref(), "NACIMIENTO")?,
        required(cli.number.as_ref(), "NUMERO")?,
    ))
}

/// Parses a human-readable duration (`250ms`, `5s`, `1m30s`, `2h`) or a bare
/// number of milliseconds.
pub fn parse_period(text: &str) -> Result<Duration, ConfigError> {
    let text = text.trim();
    if let Ok(ms) = text.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }
    humantime::parse_duration(text).map_err(|err| ConfigError::InvalidPeriod {
        value: text.to_owned(),
        reason: err.to_string(),
    })
}
