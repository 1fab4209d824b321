//! Thread-safe counter for allocating request ids.
//!
//! # What is a request id? (for beginners)
//!
//! Every request a client sends carries a 64-bit *request id* in its header,
//! and the server copies that id into the response header.  Because both
//! sides agree on the id, the client can check that the response it just read
//! really answers the request it just sent.  A mismatch means the connection
//! is out of step (for example a stale response left over from an earlier
//! timeout), and the client treats it as an error instead of trusting the
//! payload.
//!
//! # Thread safety
//!
//! The counter uses `AtomicU64` internally.  An atomic operation reads,
//! modifies, and writes a value as a single indivisible step, so two tasks
//! sharing one counter can both call `next()` without ever receiving the same
//! id.  No lock is needed for a simple increment-and-read like this.

use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe, monotonically increasing request id allocator.
///
/// Ids start at 0 and increment by 1 with each call to [`next`](Self::next).
/// The counter wraps around at `u64::MAX` back to 0 without panicking.
///
/// # Examples
///
/// ```rust
/// use cinema_core::protocol::SequenceCounter;
///
/// let counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 0);
/// assert_eq!(counter.next(), 1);
/// ```
#[derive(Debug)]
pub struct SequenceCounter {
    inner: AtomicU64,
}

impl SequenceCounter {
    /// Creates a new counter starting at 0.
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(0),
        }
    }

    /// Returns the next id and atomically increments the counter.
    ///
    /// `Ordering::Relaxed` is enough: ids only need to be unique, they do not
    /// publish any other memory to other threads.
    pub fn next(&self) -> u64 {
        // `fetch_add` returns the value before the addition and wraps on
        // overflow.
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the id the next call to [`next`](Self::next) would hand out.
    pub fn current(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}
