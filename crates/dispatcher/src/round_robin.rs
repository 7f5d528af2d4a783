//! RoundRobinDispatcher - spread records evenly over channels

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contracts::Record;
use tracing::debug;

use crate::broadcast::BroadcastDispatcher;
use crate::cancel::CancelSignal;
use crate::channel::{distinct, OutputChannel};
use crate::dispatcher::RecordDispatcher;
use crate::error::DispatchError;
use crate::metrics::DispatchMetrics;

/// Sends each data record to the next channel in rotation
///
/// The rotation counter is shared by all callers, so concurrent producers
/// interleave but never skip a channel. Poison records are broadcast.
pub struct RoundRobinDispatcher<T> {
    broadcast: BroadcastDispatcher<T>,
    next: AtomicUsize,
    cancel: CancelSignal,
}

impl<T> RoundRobinDispatcher<T> {
    pub fn new(channels: Vec<OutputChannel<T>>) -> Self {
        Self {
            broadcast: BroadcastDispatcher::new(distinct(channels)),
            next: AtomicUsize::new(0),
            cancel: CancelSignal::never(),
        }
    }

    pub fn with_cancel_signal(mut self, cancel: CancelSignal) -> Self {
        self.broadcast = self.broadcast.with_cancel_signal(cancel.clone());
        self.cancel = cancel;
        self
    }

    pub fn channels(&self) -> &[OutputChannel<T>] {
        self.broadcast.channels()
    }

    /// Counters shared with the poison broadcast
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        self.broadcast.metrics()
    }
}

impl<T: Debug> RoundRobinDispatcher<T> {
    pub async fn dispatch_with(
        &self,
        record: Record<T>,
        cancel: &CancelSignal,
    ) -> Result<(), DispatchError> {
        let payload = match record {
            Record::Poison => return self.broadcast.broadcast_poison_with(cancel).await,
            Record::Data(payload) => payload,
        };

        let channels = self.broadcast.channels();
        if channels.is_empty() {
            self.metrics().inc_dropped_count();
            observability::record_dropped_unmatched();
            debug!(record = ?payload, "No channels, record dropped");
            return Ok(());
        }

        let channel = &channels[self.next.fetch_add(1, Ordering::Relaxed) % channels.len()];
        match channel.put(Record::Data(payload), cancel).await {
            Ok(()) => {
                self.metrics().inc_routed_count();
                observability::record_routed(channel.name());
                Ok(())
            }
            Err(e) => {
                self.metrics().record_failure(&e);
                Err(e)
            }
        }
    }
}

impl<T> RecordDispatcher<T> for RoundRobinDispatcher<T>
where
    T: Debug + Send + Sync,
{
    async fn dispatch(&self, record: Record<T>) -> Result<(), DispatchError> {
        self.dispatch_with(record, &self.cancel).await
    }
}
