//! SinkHandle - consumer worker draining one output channel into a sink
//!
//! The worker stops at the first poison record, which is how the router's
//! shutdown broadcast reaches each consumer.

use std::sync::Arc;

use contracts::{ChannelName, Record, RecordSink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use crate::metrics::SinkMetrics;

/// What a consumer did before it stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerReport {
    pub name: ChannelName,
    pub written: u64,
    pub failures: u64,
    /// Stopped on a poison record rather than on closed senders
    pub poisoned: bool,
}

/// Handle to a running sink worker
pub struct SinkHandle {
    name: ChannelName,
    metrics: Arc<SinkMetrics>,
    worker_handle: JoinHandle<ConsumerReport>,
}

impl SinkHandle {
    /// Spawn a worker consuming `rx` into `sink`
    pub fn spawn<T, S>(sink: S, rx: mpsc::Receiver<Record<T>>) -> Self
    where
        T: Send + 'static,
        S: RecordSink<T> + Send + 'static,
    {
        let name = ChannelName::from(sink.name());
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle =
            tokio::spawn(async move { sink_worker(sink, rx, worker_metrics, worker_name).await });

        Self {
            name,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &ChannelName {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    pub fn is_finished(&self) -> bool {
        self.worker_handle.is_finished()
    }

    /// Wait for the worker to stop
    #[instrument(name = "sink_handle_join", skip(self), fields(sink = %self.name))]
    pub async fn join(self) -> ConsumerReport {
        match self.worker_handle.await {
            Ok(report) => report,
            Err(e) => {
                error!(sink = %self.name, error = ?e, "Worker task panicked");
                ConsumerReport {
                    name: self.name,
                    written: self.metrics.write_count(),
                    failures: self.metrics.failure_count(),
                    poisoned: false,
                }
            }
        }
    }
}

/// Worker task that consumes records and writes them to the sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<T, S>(
    mut sink: S,
    mut rx: mpsc::Receiver<Record<T>>,
    metrics: Arc<SinkMetrics>,
    name: ChannelName,
) -> ConsumerReport
where
    T: Send,
    S: RecordSink<T>,
{
    debug!(sink = %name, "Sink worker started");
    let mut poisoned = false;

    while let Some(record) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        let Record::Data(payload) = record else {
            poisoned = true;
            debug!(sink = %name, "Poison record received");
            break;
        };

        match sink.write(&payload).await {
            Ok(()) => {
                metrics.inc_write_count();
                observability::record_sink_write(&name);
            }
            Err(e) => {
                metrics.inc_failure_count();
                observability::record_sink_failure(&name);
                error!(sink = %name, error = %e, "Write failed");
                // Keep consuming: one bad record must not stall the channel
            }
        }
    }

    if !poisoned {
        warn!(sink = %name, "All producers gone before poison record");
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
    ConsumerReport {
        name,
        written: metrics.write_count(),
        failures: metrics.failure_count(),
        poisoned,
    }
}
