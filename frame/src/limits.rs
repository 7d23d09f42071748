//! Configurable limits for bounded frame reads.

/// Frame-level limits.
///
/// Responses on this protocol are a single short line, so the defaults are
/// generous. The read chunk size only affects how many `read` calls a frame
/// takes, never the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLimits {
    /// Number of bytes requested per underlying `read` call.
    pub read_chunk_size: usize,

    /// Maximum bytes buffered while waiting for a delimiter.
    pub max_frame_bytes: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            read_chunk_size: 1024,
            max_frame_bytes: 64 * 1024,
        }
    }
}

impl FrameLimits {
    /// Creates limits with tiny reads, so tests cross chunk boundaries often.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            read_chunk_size: 4,
            max_frame_bytes: 4096,
        }
    }

    /// Creates limits with no frame size cap (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            read_chunk_size: 1024,
            max_frame_bytes: usize::MAX,
        }
    }
}
