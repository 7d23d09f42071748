//! Session configuration.

use std::time::Duration;

use frame::FrameLimits;
use message::BatchLimits;

/// Default pause between batches and between winner polls.
pub const DEFAULT_LOOP_PERIOD: Duration = Duration::from_secs(5);

/// How records are put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadMode {
    /// Records grouped into `BETS=` batch frames.
    #[default]
    Batch,
    /// One bare record frame per connection.
    Single,
}

/// Settings for one [`ClientSession`](crate::ClientSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Agency id stamped on control messages.
    pub client_id: String,
    /// Pause between full batches and between winner polls.
    pub loop_period: Duration,
    /// Requested batch size; clamped by `batch_limits`.
    pub batch_max_amount: usize,
    /// Batched or one record per frame.
    pub upload_mode: UploadMode,
    /// Protocol ceiling applied to `batch_max_amount`.
    pub batch_limits: BatchLimits,
    /// Limits for every frame exchanged.
    pub frame_limits: FrameLimits,
}

impl SessionConfig {
    /// Batch mode at the protocol cap with default limits.
    pub fn new(client_id: impl Into<String>) -> Self {
        let batch_limits = BatchLimits::default();
        Self {
            client_id: client_id.into(),
            loop_period: DEFAULT_LOOP_PERIOD,
            batch_max_amount: batch_limits.max_bets_per_batch,
            upload_mode: UploadMode::Batch,
            batch_limits,
            frame_limits: FrameLimits::default(),
        }
    }

    /// Sets the pause between full batches and between winner polls.
    #[must_use]
    pub fn with_loop_period(mut self, period: Duration) -> Self {
        self.loop_period = period;
        self
    }

    /// Sets the requested batch size; clamped by [`Self::chunk_size`].
    #[must_use]
    pub fn with_batch_max_amount(mut self, amount: usize) -> Self {
        self.batch_max_amount = amount;
        self
    }

    /// Sets whether records go out batched or one per frame.
    #[must_use]
    pub fn with_upload_mode(mut self, mode: UploadMode) -> Self {
        self.upload_mode = mode;
        self
    }

    /// Sets the framing limits used on every connection.
    #[must_use]
    pub fn with_frame_limits(mut self, limits: FrameLimits) -> Self {
        self.frame_limits = limits;
        self
    }

    /// Records drawn from the source per operation.
    pub fn chunk_size(&self) -> usize {
        match self.upload_mode {
            UploadMode::Single => 1,
            UploadMode::Batch => self.batch_limits.effective_batch_size(self.batch_max_amount),
        }
    }
}
