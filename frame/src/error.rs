//! Error types for frame operations.

use std::io;

/// Result type for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors that can occur while sending or receiving frames.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FrameError {
    /// The underlying stream failed to read or write.
    #[error("stream i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the stream before a complete frame arrived.
    #[error("connection closed before frame delimiter ({received} bytes buffered)")]
    ConnectionClosed {
        /// Bytes of the partial frame received before the close.
        received: usize,
    },

    /// Outgoing payload contains the frame delimiter.
    #[error("payload contains frame delimiter at byte {position}")]
    DelimiterInPayload {
        /// Byte offset of the first delimiter in the payload.
        position: usize,
    },

    /// Incoming frame grew past the configured maximum.
    #[error("frame limit exceeded: {actual} > {limit} bytes")]
    LimitsExceeded { limit: usize, actual: usize },
}

impl FrameError {
    /// Returns `true` if the peer closed the stream mid-frame.
    #[must_use]
    pub const fn is_connection_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed { .. })
    }
}
