//! ContentBasedDispatcher - route each record by its content
//!
//! Data records go to the channel of the first matching route, else to the
//! default channel, else nowhere. Poison records are broadcast to every
//! channel of the table.

use std::fmt::Debug;
use std::sync::Arc;

use contracts::{ChannelName, Record};
use tracing::{debug, instrument};

use crate::broadcast::BroadcastDispatcher;
use crate::cancel::CancelSignal;
use crate::channel::OutputChannel;
use crate::dispatcher::RecordDispatcher;
use crate::error::DispatchError;
use crate::metrics::DispatchMetrics;
use crate::table::RoutingTable;

#[derive(Debug, Clone, Copy)]
enum Destination {
    Route,
    Default,
}

/// Routes records through an immutable [`RoutingTable`]
///
/// Holds no mutable routing state, so one instance can be shared by any
/// number of producer tasks.
pub struct ContentBasedDispatcher<T> {
    table: RoutingTable<T>,
    broadcast: BroadcastDispatcher<T>,
    cancel: CancelSignal,
    metrics: Arc<DispatchMetrics>,
}

impl<T> ContentBasedDispatcher<T> {
    #[instrument(
        name = "content_based_dispatcher_new",
        skip(table),
        fields(routes = table.routes().len(), has_default = table.default_channel().is_some())
    )]
    pub fn new(table: RoutingTable<T>) -> Self {
        let metrics = Arc::new(DispatchMetrics::new());
        let broadcast =
            BroadcastDispatcher::new(table.channels()).with_metrics(Arc::clone(&metrics));
        debug!(channels = broadcast.channels().len(), "Content-based dispatcher ready");
        Self {
            table,
            broadcast,
            cancel: CancelSignal::never(),
            metrics,
        }
    }

    /// Abort blocked enqueues, poison broadcast included, when `cancel` fires
    pub fn with_cancel_signal(mut self, cancel: CancelSignal) -> Self {
        self.broadcast = self.broadcast.with_cancel_signal(cancel.clone());
        self.cancel = cancel;
        self
    }

    pub fn table(&self) -> &RoutingTable<T> {
        &self.table
    }

    /// Distinct channels poison records are broadcast to
    pub fn channels(&self) -> &[OutputChannel<T>] {
        self.broadcast.channels()
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// Name of the channel `payload` would be routed to, `None` if dropped
    pub fn route_of(&self, payload: &T) -> Option<&ChannelName> {
        self.table.select(payload).map(OutputChannel::name)
    }
}

impl<T: Debug> ContentBasedDispatcher<T> {
    /// [`dispatch`](RecordDispatcher::dispatch) with a per-call cancel signal
    pub async fn dispatch_with(
        &self,
        record: Record<T>,
        cancel: &CancelSignal,
    ) -> Result<(), DispatchError> {
        let payload = match record {
            Record::Poison => return self.broadcast.broadcast_poison_with(cancel).await,
            Record::Data(payload) => payload,
        };

        if let Some(route) = self.table.matching_route(&payload) {
            return self
                .enqueue(route.channel(), payload, cancel, Destination::Route)
                .await;
        }

        match self.table.default_channel() {
            Some(channel) => {
                self.enqueue(channel, payload, cancel, Destination::Default)
                    .await
            }
            None => {
                self.metrics.inc_dropped_count();
                observability::record_dropped_unmatched();
                debug!(record = ?payload, "No route matched and no default channel, record dropped");
                Ok(())
            }
        }
    }

    async fn enqueue(
        &self,
        channel: &OutputChannel<T>,
        payload: T,
        cancel: &CancelSignal,
        destination: Destination,
    ) -> Result<(), DispatchError> {
        if let Err(e) = channel.put(Record::Data(payload), cancel).await {
            self.metrics.record_failure(&e);
            return Err(e);
        }

        match destination {
            Destination::Route => {
                self.metrics.inc_routed_count();
                observability::record_routed(channel.name());
            }
            Destination::Default => {
                self.metrics.inc_defaulted_count();
                observability::record_defaulted(channel.name());
            }
        }
        Ok(())
    }
}

impl<T> RecordDispatcher<T> for ContentBasedDispatcher<T>
where
    T: Debug + Send + Sync,
{
    async fn dispatch(&self, record: Record<T>) -> Result<(), DispatchError> {
        self.dispatch_with(record, &self.cancel).await
    }
}
