//! In-process counters for dispatchers and sinks

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tracing::warn;

use crate::error::DispatchError;

/// Outcome counters for one dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Records enqueued via a matching route
    routed_count: AtomicU64,
    /// Records enqueued into the default channel
    defaulted_count: AtomicU64,
    /// Records dropped: no route matched and no default channel
    dropped_count: AtomicU64,
    /// Poison records broadcast
    poison_count: AtomicU64,
    /// Enqueues that failed
    failure_count: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routed_count(&self) -> u64 {
        self.routed_count.load(Ordering::Relaxed)
    }

    pub fn inc_routed_count(&self) {
        self.routed_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn defaulted_count(&self) -> u64 {
        self.defaulted_count.load(Ordering::Relaxed)
    }

    pub fn inc_defaulted_count(&self) {
        self.defaulted_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn poison_count(&self) -> u64 {
        self.poison_count.load(Ordering::Relaxed)
    }

    pub fn inc_poison_count(&self) {
        self.poison_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed dispatch, export it and log it
    ///
    /// The only place dispatchers report failures, so each failed dispatch
    /// is counted once whichever strategy returned it.
    pub fn record_failure(&self, error: &DispatchError) {
        self.inc_failure_count();
        observability::record_dispatch_failure(error.channel(), error.reason());
        warn!(channel = %error.channel(), error = %error, "Dispatch failed");
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            routed_count: self.routed_count(),
            defaulted_count: self.defaulted_count(),
            dropped_count: self.dropped_count(),
            poison_count: self.poison_count(),
            failure_count: self.failure_count(),
        }
    }
}

/// Snapshot of dispatcher counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSnapshot {
    pub routed_count: u64,
    pub defaulted_count: u64,
    pub dropped_count: u64,
    pub poison_count: u64,
    pub failure_count: u64,
}

impl DispatchSnapshot {
    /// Data records that reached a channel
    pub fn delivered(&self) -> u64 {
        self.routed_count + self.defaulted_count
    }
}

/// Metrics for a single sink worker
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Records waiting in the channel at last receive
    queue_len: AtomicUsize,
    /// Total successful writes
    write_count: AtomicU64,
    /// Total write failures
    failure_count: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    pub fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }
}
