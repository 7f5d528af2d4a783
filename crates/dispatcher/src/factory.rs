//! Router factory
//!
//! Turns a [`RouterBlueprint`] into running consumers plus the dispatcher
//! feeding them. Records are text lines.

use std::sync::Arc;

use contracts::{ChannelConfig, DispatchStrategy, Record, RouterBlueprint, SinkType};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use crate::broadcast::BroadcastDispatcher;
use crate::cancel::CancelSignal;
use crate::channel::OutputChannel;
use crate::content_based::ContentBasedDispatcher;
use crate::dispatcher::RecordDispatcher;
use crate::error::{DispatchError, RoutingError};
use crate::handle::{ConsumerReport, SinkHandle};
use crate::matcher::build_routing_table;
use crate::metrics::DispatchMetrics;
use crate::round_robin::RoundRobinDispatcher;
use crate::sinks::{FileSink, LogSink};

/// Dispatcher selected by the blueprint's strategy
pub enum Router {
    ContentBased(ContentBasedDispatcher<String>),
    RoundRobin(RoundRobinDispatcher<String>),
    Broadcast(BroadcastDispatcher<String>),
}

impl Router {
    pub fn strategy(&self) -> DispatchStrategy {
        match self {
            Self::ContentBased(_) => DispatchStrategy::ContentBased,
            Self::RoundRobin(_) => DispatchStrategy::RoundRobin,
            Self::Broadcast(_) => DispatchStrategy::Broadcast,
        }
    }

    /// Channels this router can deliver to
    pub fn channels(&self) -> &[OutputChannel<String>] {
        match self {
            Self::ContentBased(d) => d.channels(),
            Self::RoundRobin(d) => d.channels(),
            Self::Broadcast(d) => d.channels(),
        }
    }

    /// Routing outcome counters
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        match self {
            Self::ContentBased(d) => d.metrics(),
            Self::RoundRobin(d) => d.metrics(),
            Self::Broadcast(d) => d.metrics(),
        }
    }

    pub async fn dispatch_with(
        &self,
        record: Record<String>,
        cancel: &CancelSignal,
    ) -> Result<(), DispatchError> {
        match self {
            Self::ContentBased(d) => d.dispatch_with(record, cancel).await,
            Self::RoundRobin(d) => d.dispatch_with(record, cancel).await,
            Self::Broadcast(d) => d.dispatch_with(record, cancel).await,
        }
    }
}

impl RecordDispatcher<String> for Router {
    async fn dispatch(&self, record: Record<String>) -> Result<(), DispatchError> {
        match self {
            Self::ContentBased(d) => d.dispatch(record).await,
            Self::RoundRobin(d) => d.dispatch(record).await,
            Self::Broadcast(d) => d.dispatch(record).await,
        }
    }
}

/// A router together with the consumers draining its channels
pub struct RouterRuntime {
    pub router: Router,
    pub consumers: Vec<SinkHandle>,
}

impl RouterRuntime {
    /// Drop the router and wait for every consumer
    ///
    /// Consumers that already saw poison stop on it; the rest stop once
    /// their channel closes.
    pub async fn shutdown(self) -> Vec<ConsumerReport> {
        let Self { router, consumers } = self;
        drop(router);

        let mut reports = Vec::with_capacity(consumers.len());
        for handle in consumers {
            reports.push(handle.join().await);
        }
        reports
    }
}

/// Build channels, spawn one consumer per channel and create the dispatcher
///
/// Must be called inside a tokio runtime. `cancel` guards every blocking
/// enqueue of the returned router. The blueprint need not be validated; a
/// zero-capacity channel is rejected before anything is spawned.
#[instrument(
    name = "create_router",
    skip(blueprint, cancel),
    fields(strategy = ?blueprint.router.strategy, channels = blueprint.channels.len())
)]
pub fn create_router(
    blueprint: &RouterBlueprint,
    cancel: CancelSignal,
) -> Result<RouterRuntime, RoutingError> {
    let mut channels = Vec::with_capacity(blueprint.channels.len());
    let mut consumers = Vec::with_capacity(blueprint.channels.len());

    for config in &blueprint.channels {
        if config.capacity == 0 {
            return Err(RoutingError::InvalidCapacity {
                channel: config.name.clone(),
            });
        }
        let (channel, rx) = OutputChannel::bounded(config.name.as_str(), config.capacity);
        consumers.push(spawn_consumer(config, rx)?);
        channels.push(channel);
    }

    let router = match blueprint.router.strategy {
        DispatchStrategy::ContentBased => {
            for name in blueprint.unrouted_channels() {
                warn!(channel = %name, "Channel is not reachable by any route");
            }
            let table = build_routing_table(
                &blueprint.routes,
                blueprint.router.default_channel.as_deref(),
                &channels,
            )?;
            Router::ContentBased(ContentBasedDispatcher::new(table).with_cancel_signal(cancel))
        }
        DispatchStrategy::RoundRobin => {
            Router::RoundRobin(RoundRobinDispatcher::new(channels).with_cancel_signal(cancel))
        }
        DispatchStrategy::Broadcast => {
            Router::Broadcast(BroadcastDispatcher::new(channels).with_cancel_signal(cancel))
        }
    };

    info!(
        strategy = ?router.strategy(),
        consumers = consumers.len(),
        "Router created"
    );

    Ok(RouterRuntime { router, consumers })
}

fn spawn_consumer(
    config: &ChannelConfig,
    rx: mpsc::Receiver<Record<String>>,
) -> Result<SinkHandle, RoutingError> {
    match config.sink {
        SinkType::Log => Ok(SinkHandle::spawn(LogSink::new(config.name.as_str()), rx)),
        SinkType::File => {
            let sink = FileSink::from_params(config.name.as_str(), &config.params).map_err(|e| {
                RoutingError::SinkSetup {
                    channel: config.name.clone(),
                    message: e.to_string(),
                }
            })?;
            Ok(SinkHandle::spawn(sink, rx))
        }
    }
}
