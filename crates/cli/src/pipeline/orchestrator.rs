//! Pipeline orchestrator - input stream → router → consumers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{Record, RouterBlueprint};
use dispatcher::{cancel_pair, CancelHandle, RecordDispatcher};
use observability::LatencyStats;
use tokio::io::AsyncBufReadExt;
use tracing::{debug, info, warn};

use super::{InputSource, PipelineStats};
use crate::error::{CliError, Result};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Routing blueprint
    pub blueprint: RouterBlueprint,

    /// Where records come from
    pub input: InputSource,

    /// Cancel pending dispatches after this long (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    cancel: Arc<CancelHandle>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let (cancel, _) = cancel_pair();
        Self {
            config,
            cancel: Arc::new(cancel),
        }
    }

    /// Handle that stops the run: reading ends and blocked dispatches fail
    pub fn cancel_handle(&self) -> Arc<CancelHandle> {
        Arc::clone(&self.cancel)
    }

    /// Route the whole input, then poison every channel and wait for consumers
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port).map_err(CliError::Metrics)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let signal = self.cancel.signal();
        let runtime = dispatcher::create_router(blueprint, signal.clone())?;

        let timer = self.config.timeout.map(|timeout| {
            let cancel = Arc::clone(&self.cancel);
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
                cancel.cancel();
            })
        });

        info!(input = %self.config.input, "Reading records");
        let mut lines = self.config.input.open().await?.lines();

        let mut stats = PipelineStats {
            strategy: blueprint.router.strategy,
            ..Default::default()
        };
        let mut latency = LatencyStats::default();

        loop {
            let line = tokio::select! {
                biased;
                _ = signal.cancelled() => {
                    stats.cancelled = true;
                    break;
                }
                line = lines.next_line() => line.map_err(CliError::InputRead)?,
            };
            let Some(line) = line else {
                debug!(records = stats.records_read, "End of input");
                break;
            };
            stats.records_read += 1;

            let dispatched_at = Instant::now();
            match runtime.router.dispatch(Record::Data(line)).await {
                Ok(()) => latency.push(dispatched_at.elapsed().as_secs_f64() * 1000.0),
                Err(e) if e.is_cancelled() => {
                    warn!(channel = %e.channel(), "Dispatch cancelled, stopping input");
                    stats.cancelled = true;
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Record not delivered");
                    stats.dispatch_failures += 1;
                }
            }
        }

        // A cancelled run skips poison: consumers stop once the router is dropped.
        if !stats.cancelled {
            match runtime.router.dispatch(Record::Poison).await {
                Ok(()) => stats.poison_sent = true,
                Err(e) => warn!(error = %e, "Poison record not delivered"),
            }
        }

        if let Some(timer) = timer {
            timer.abort();
        }

        stats.dispatch = Some(runtime.router.metrics().snapshot());
        info!("Waiting for consumers...");
        stats.consumers = runtime.shutdown().await;
        stats.latency = latency.summary();
        stats.duration = start_time.elapsed();

        info!(
            records = stats.records_read,
            written = stats.records_written(),
            cancelled = stats.cancelled,
            duration_secs = stats.duration.as_secs_f64(),
            "Pipeline finished"
        );

        Ok(stats)
    }
}
