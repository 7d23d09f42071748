//! Frame send/receive over a blocking byte stream.

use std::io::{self, Read, Write};

use crate::error::{FrameError, FrameResult};
use crate::limits::FrameLimits;

/// Byte that terminates every frame.
pub const DELIMITER: u8 = b'\n';

/// Message-oriented channel over an ordered, reliable byte stream.
///
/// Every frame is its payload followed by one [`DELIMITER`]. Writes loop until
/// the whole buffer is accepted and reads accumulate until a delimiter shows
/// up, so short reads and short writes never surface to the caller.
///
/// Bytes that arrive after a delimiter are kept and returned by the next
/// [`receive`](Self::receive).
#[derive(Debug)]
pub struct FrameCodec<S> {
    stream: S,
    limits: FrameLimits,
    pending: Vec<u8>,
}

impl<S> FrameCodec<S> {
    /// Wraps a stream with default limits.
    pub fn new(stream: S) -> Self {
        Self::with_limits(stream, FrameLimits::default())
    }

    /// Wraps a stream with explicit limits.
    pub const fn with_limits(stream: S, limits: FrameLimits) -> Self {
        Self {
            stream,
            limits,
            pending: Vec::new(),
        }
    }

    /// Returns the limits in effect.
    pub const fn limits(&self) -> &FrameLimits {
        &self.limits
    }

    /// Returns a reference to the underlying stream.
    pub const fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Returns the number of received bytes not yet handed out as a frame.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Unwraps the codec, returning the underlying stream.
    ///
    /// Buffered bytes that did not form a frame yet are dropped.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Write> FrameCodec<S> {
    /// Writes `payload` in full.
    ///
    /// A single `write` may accept fewer bytes than offered; this keeps
    /// advancing until every byte is written or the stream fails.
    pub fn send(&mut self, payload: &[u8]) -> FrameResult<()> {
        let mut written = 0usize;
        while written < payload.len() {
            match self.stream.write(&payload[written..]) {
                Ok(0) => {
                    return Err(FrameError::Io(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "stream accepted zero bytes",
                    )));
                }
                Ok(n) => written += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        self.stream.flush()?;
        Ok(())
    }

    /// Sends `payload` as one frame, appending the delimiter.
    pub fn send_frame(&mut self, payload: &str) -> FrameResult<()> {
        if let Some(position) = payload.bytes().position(|byte| byte == DELIMITER) {
            return Err(FrameError::DelimiterInPayload { position });
        }
        let mut bytes = Vec::with_capacity(payload.len() + 1);
        bytes.extend_from_slice(payload.as_bytes());
        bytes.push(DELIMITER);
        self.send(&bytes)
    }
}

impl<S: Read> FrameCodec<S> {
    /// Reads the next frame and returns its payload without the delimiter.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. A zero-byte read before
    /// the delimiter is reported as [`FrameError::ConnectionClosed`].
    pub fn receive(&mut self) -> FrameResult<String> {
        let mut chunk = vec![0u8; self.limits.read_chunk_size.max(1)];
        // The delimiter may straddle two reads, so scan everything not yet
        // searched rather than only the latest chunk.
        let mut searched = 0usize;
        loop {
            if let Some(offset) = self.pending[searched..]
                .iter()
                .position(|&byte| byte == DELIMITER)
            {
                let end = searched + offset;
                let frame: Vec<u8> = self.pending.drain(..=end).collect();
                return Ok(String::from_utf8_lossy(&frame[..end]).into_owned());
            }
            searched = self.pending.len();

            if self.pending.len() > self.limits.max_frame_bytes {
                return Err(FrameError::LimitsExceeded {
                    limit: self.limits.max_frame_bytes,
                    actual: self.pending.len(),
                });
            }

            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    return Err(FrameError::ConnectionClosed {
                        received: self.pending.len(),
                    });
                }
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }
}
