//! Client session for uploading an agency's bets.
//!
//! A [`ClientSession`] walks through three phases: upload every record in
//! bounded batches, announce that no more bets follow, then poll until the
//! server publishes the winners. Each exchange uses a fresh connection that
//! is closed as soon as the reply is decoded.
//!
//! # Design Principles
//!
//! - **Connection per operation** - Streams come from a [`Connector`] and are
//!   dropped at the end of each exchange, on every path.
//! - **Pluggable seams** - Records come from a [`BetSource`], pauses go
//!   through a [`Pacer`], so tests can drive the session without sockets or
//!   sleeps.
//! - **Fail fast, poll patiently** - Transport failures end the run; a winners
//!   reply that is not yet `success` is retried without limit.
//! - **Events, not sinks** - The session emits `tracing` events inside a
//!   `session` span; the caller picks the subscriber.
//!
//! # Example
//!
//! ```no_run
//! use session::{ClientSession, CsvSource, SessionConfig, TcpConnector};
//!
//! let config = SessionConfig::new("1");
//! let mut source = CsvSource::open("/data/agency.csv", "1")?;
//! let mut session = ClientSession::new(config, TcpConnector::new("server:12345"))?;
//! let summary = session.run(&mut source)?;
//! println!("winners: {}", summary.winners.message);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod config;
mod connector;
mod error;
mod pacer;
pub mod source;

pub use client::{ClientSession, SessionPhase, SessionSummary};
pub use config::{SessionConfig, UploadMode, DEFAULT_LOOP_PERIOD};
pub use connector::{Connector, TcpConnector};
pub use error::{Operation, SessionError, SessionResult, SourceError, SourceResult};
pub use pacer::{Pacer, ThreadPacer};
pub use source::{BetSource, CsvSource, MemorySource, RepeatSource};
