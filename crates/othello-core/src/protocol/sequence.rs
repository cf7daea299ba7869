//! Per-sender frame numbering.
//!
//! Each side of a connection stamps its outgoing frames with a sequence
//! number from its own counter. The numbers let a log reader match up what
//! one peer sent with what the other received; nothing in the game logic
//! depends on them.

use std::sync::atomic::{AtomicU64, Ordering};

/// A lock-free, monotonically increasing frame counter.
///
/// Starts at 0 and wraps back to 0 after `u64::MAX`.
///
/// ```rust
/// use othello_core::protocol::SequenceCounter;
///
/// let counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 0);
/// assert_eq!(counter.next(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SequenceCounter {
    inner: AtomicU64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(0),
        }
    }

    /// Returns the next number and advances the counter.
    pub fn next(&self) -> u64 {
        // Relaxed: the value orders frames, it does not publish memory.
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of frames stamped so far.
    pub fn current(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }
}
