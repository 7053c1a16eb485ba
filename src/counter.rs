//! Per-instance visit counter.
//!
//! Each running instance owns its own count; replicas behind a load balancer
//! diverge, which is what the dashboard is meant to show.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counter bumped once per dashboard view and read by the identity endpoint.
#[derive(Debug, Default)]
pub struct RequestCounter {
    count: AtomicU64,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one and return the new value.
    ///
    /// The read-modify-write is a single atomic operation, so concurrent
    /// callers each observe a distinct value.
    pub fn increment(&self) -> u64 {
        let current = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(count = current, "Counter incremented");
        current
    }

    /// Current value, without changing it.
    pub fn peek(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}
