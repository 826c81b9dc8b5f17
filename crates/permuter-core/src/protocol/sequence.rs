//! Thread-safe request id counter for correlating calls with replies.
//!
//! Every frame header carries a `request_id`.  A caller stamps each request
//! with a fresh id, and the bridge copies that id into the reply, so a caller
//! can tell which request a reply answers.
//!
//! Id `0` is reserved for frames that are not answers to any readable
//! request (for example an `Error` sent after a header that could not be
//! parsed), so the counter starts at 1.

use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe, monotonically increasing source of request ids.
///
/// # Examples
///
/// ```rust
/// use permuter_core::protocol::RequestIdCounter;
///
/// let ids = RequestIdCounter::new();
/// assert_eq!(ids.next(), 1);
/// assert_eq!(ids.next(), 2);
/// ```
#[derive(Debug)]
pub struct RequestIdCounter {
    inner: AtomicU64,
}

impl RequestIdCounter {
    /// Creates a counter whose first id is 1.
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(1),
        }
    }

    /// Returns the next id and atomically advances the counter.
    ///
    /// Wraps from `u64::MAX` past the reserved `0` back to 1.
    pub fn next(&self) -> u64 {
        // Relaxed: ids only need uniqueness, not cross-thread memory ordering.
        let id = self.inner.fetch_add(1, Ordering::Relaxed);
        if id == 0 {
            self.inner.fetch_add(1, Ordering::Relaxed)
        } else {
            id
        }
    }
}

impl Default for RequestIdCounter {
    fn default() -> Self {
        Self::new()
    }
}
