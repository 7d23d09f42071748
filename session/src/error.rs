//! Error types for session operations.

use std::fmt;
use std::io;

use frame::FrameError;
use message::MessageError;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type for bet sources.
pub type SourceResult<T> = Result<T, SourceError>;

/// One request/response exchange performed by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Upload of the n-th batch frame (1-based).
    SendBatch { batch: usize },
    /// Upload of the n-th single bet frame (1-based).
    SendBet { bet: usize },
    /// The no-more-bets notice.
    NoMoreBets,
    /// The n-th winners query (1-based).
    GetWinners { attempt: usize },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendBatch { batch } => write!(f, "send batch {batch}"),
            Self::SendBet { bet } => write!(f, "send bet {bet}"),
            Self::NoMoreBets => write!(f, "no-more-bets notice"),
            Self::GetWinners { attempt } => write!(f, "winners query {attempt}"),
        }
    }
}

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The connection for an operation could not be opened.
    #[error("{operation}: connect failed: {source}")]
    Connect {
        operation: Operation,
        source: io::Error,
    },

    /// Reading or writing the stream failed.
    #[error("{operation}: i/o failed: {source}")]
    Io {
        operation: Operation,
        source: io::Error,
    },

    /// The peer closed the connection before a full reply arrived.
    #[error("{operation}: connection closed by peer after {received} reply bytes")]
    ConnectionClosed { operation: Operation, received: usize },

    /// Any other framing failure (oversized reply, delimiter in payload).
    #[error("{operation}: {source}")]
    Frame {
        operation: Operation,
        source: FrameError,
    },

    /// The bet source returned more records than the frame may carry.
    #[error("{operation}: source returned {actual} records, at most {max} fit one frame")]
    ChunkTooLarge {
        operation: Operation,
        max: usize,
        actual: usize,
    },

    /// The bet source failed to produce records.
    #[error("bet source failed: {0}")]
    Source(#[from] SourceError),

    /// A control message could not be built.
    #[error("invalid message: {0}")]
    Message(#[from] MessageError),
}

impl SessionError {
    /// Attributes a framing failure to `operation`.
    pub fn from_frame(operation: Operation, err: FrameError) -> Self {
        match err {
            FrameError::Io(source) => Self::Io { operation, source },
            FrameError::ConnectionClosed { received } => Self::ConnectionClosed {
                operation,
                received,
            },
            source => Self::Frame { operation, source },
        }
    }

    /// Returns the operation that failed, if the failure belongs to one.
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::Connect { operation, .. }
            | Self::Io { operation, .. }
            | Self::ConnectionClosed { operation, .. }
            | Self::Frame { operation, .. }
            | Self::ChunkTooLarge { operation, .. } => Some(*operation),
            Self::Source(_) | Self::Message(_) => None,
        }
    }
}

/// Errors raised while reading bets.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SourceError {
    /// The underlying reader failed.
    #[error("failed to read bets: {0}")]
    Io(#[from] io::Error),
}
