//! BroadcastDispatcher - every record to every channel

use std::fmt::Debug;
use std::sync::Arc;

use contracts::Record;
use tracing::debug;

use crate::cancel::CancelSignal;
use crate::channel::OutputChannel;
use crate::dispatcher::RecordDispatcher;
use crate::error::DispatchError;
use crate::metrics::DispatchMetrics;

/// Delivers each record to all of a fixed list of channels
///
/// Channels are filled in list order. When an enqueue fails the remaining
/// channels are skipped; channels already filled keep their copy.
pub struct BroadcastDispatcher<T> {
    channels: Vec<OutputChannel<T>>,
    cancel: CancelSignal,
    metrics: Arc<DispatchMetrics>,
}

impl<T> BroadcastDispatcher<T> {
    pub fn new(channels: Vec<OutputChannel<T>>) -> Self {
        Self {
            channels,
            cancel: CancelSignal::never(),
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Abort blocked enqueues when `cancel` fires
    pub fn with_cancel_signal(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Count into `metrics` instead of a private set of counters
    pub(crate) fn with_metrics(mut self, metrics: Arc<DispatchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn channels(&self) -> &[OutputChannel<T>] {
        &self.channels
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }
}

impl<T: Debug> BroadcastDispatcher<T> {
    /// Send the end-of-stream signal to every channel
    pub async fn broadcast_poison(&self) -> Result<(), DispatchError> {
        self.broadcast_poison_with(&self.cancel).await
    }

    /// [`broadcast_poison`](Self::broadcast_poison) with a per-call cancel signal
    pub async fn broadcast_poison_with(&self, cancel: &CancelSignal) -> Result<(), DispatchError> {
        for channel in &self.channels {
            if let Err(e) = channel.put(Record::Poison, cancel).await {
                self.metrics.record_failure(&e);
                return Err(e);
            }
        }
        self.metrics.inc_poison_count();
        observability::record_poison_broadcast(self.channels.len());
        debug!(channels = self.channels.len(), "Poison record broadcast");
        Ok(())
    }
}

impl<T: Clone + Debug> BroadcastDispatcher<T> {
    /// [`dispatch`](RecordDispatcher::dispatch) with a per-call cancel signal
    pub async fn dispatch_with(
        &self,
        record: Record<T>,
        cancel: &CancelSignal,
    ) -> Result<(), DispatchError> {
        let payload = match record {
            Record::Poison => return self.broadcast_poison_with(cancel).await,
            Record::Data(payload) => payload,
        };

        for channel in &self.channels {
            if let Err(e) = channel.put(Record::Data(payload.clone()), cancel).await {
                self.metrics.record_failure(&e);
                return Err(e);
            }
            observability::record_routed(channel.name());
        }
        self.metrics.inc_routed_count();
        Ok(())
    }
}

impl<T> RecordDispatcher<T> for BroadcastDispatcher<T>
where
    T: Clone + Debug + Send + Sync,
{
    async fn dispatch(&self, record: Record<T>) -> Result<(), DispatchError> {
        self.dispatch_with(record, &self.cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancel_pair;
    use tokio::time::{sleep, timeout, Duration};

    #[tokio::test]
    async fn test_data_reaches_every_channel() {
        let (a, mut rx_a) = OutputChannel::bounded("a", 4);
        let (b, mut rx_b) = OutputChannel::bounded("b", 4);
        let broadcast = BroadcastDispatcher::new(vec![a, b]);

        broadcast.dispatch(Record::data("hello")).await.unwrap();

        assert_eq!(rx_a.recv().await, Some(Record::Data("hello")));
        assert_eq!(rx_b.recv().await, Some(Record::Data("hello")));
        assert_eq!(broadcast.metrics().routed_count(), 1);
    }

    #[tokio::test]
    async fn test_poison_reaches_every_channel() {
        let (a, mut rx_a) = OutputChannel::<String>::bounded("a", 1);
        let (b, mut rx_b) = OutputChannel::<String>::bounded("b", 1);
        let broadcast = BroadcastDispatcher::new(vec![a, b]);

        broadcast.broadcast_poison().await.unwrap();

        assert_eq!(rx_a.recv().await, Some(Record::Poison));
        assert_eq!(rx_b.recv().await, Some(Record::Poison));
        assert_eq!(broadcast.metrics().poison_count(), 1);
    }

    #[tokio::test]
    async fn test_no_channels_is_ok() {
        let broadcast = BroadcastDispatcher::<u8>::new(Vec::new());
        broadcast.dispatch(Record::data(1)).await.unwrap();
        broadcast.dispatch(Record::Poison).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_leaves_partial_broadcast() {
        let (first, mut rx_first) = OutputChannel::bounded("first", 1);
        let (second, mut rx_second) = OutputChannel::bounded("second", 1);

        // Fill the second channel so the broadcast blocks on it.
        second
            .put(Record::data(0), &CancelSignal::never())
            .await
            .unwrap();

        let (handle, signal) = cancel_pair();
        let broadcast = BroadcastDispatcher::new(vec![first, second]).with_cancel_signal(signal);
        let metrics = Arc::clone(broadcast.metrics());
        let task = tokio::spawn(async move { broadcast.dispatch(Record::data(1)).await });

        sleep(Duration::from_millis(20)).await;
        handle.cancel();

        let err = timeout(Duration::from_secs(1), task)
            .await
            .expect("cancel should unblock")
            .unwrap()
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.channel(), "second");

        // The first channel keeps its copy; the second only has the filler.
        assert_eq!(rx_first.recv().await, Some(Record::Data(1)));
        assert_eq!(rx_second.recv().await, Some(Record::Data(0)));
        assert!(rx_second.try_recv().is_err());

        let snap = metrics.snapshot();
        assert_eq!(snap.routed_count, 0);
        assert_eq!(snap.failure_count, 1);
    }
}
