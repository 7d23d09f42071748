//! Batch size limits.

/// Largest number of bets the protocol allows in one batch frame.
///
/// Derived from an 8 KiB frame budget at roughly 100 bytes per bet.
pub const PROTOCOL_MAX_BATCH_SIZE: usize = 80;

/// Limits applied when cutting bets into batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLimits {
    /// Maximum number of bets per batch frame.
    pub max_bets_per_batch: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_bets_per_batch: PROTOCOL_MAX_BATCH_SIZE,
        }
    }
}

impl BatchLimits {
    /// Creates limits with a small cap, so tests span several batches.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_bets_per_batch: 4,
        }
    }

    /// Returns the batch size actually used for a configured size.
    ///
    /// This is the lesser of `configured` and the cap, and never zero.
    #[must_use]
    pub fn effective_batch_size(&self, configured: usize) -> usize {
        configured.min(self.max_bets_per_batch).max(1)
    }
}
