//! # Dispatcher
//!
//! Record dispatch core.
//!
//! Responsible for:
//! - Routing each data record to one bounded output channel by content
//! - Broadcasting the poison record to every channel so all consumers stop
//! - Cancellable, blocking hand-off to consumers
//! - Consumer workers draining channels into sinks
//! - Building all of the above from a `RouterBlueprint`

pub mod broadcast;
pub mod cancel;
pub mod channel;
pub mod content_based;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod handle;
pub mod matcher;
pub mod metrics;
pub mod round_robin;
pub mod sinks;
pub mod table;

pub use broadcast::BroadcastDispatcher;
pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use channel::OutputChannel;
pub use content_based::ContentBasedDispatcher;
pub use contracts::{Predicate, Record, RecordSink};
pub use dispatcher::{dispatch_all, LocalRecordDispatcher, RecordDispatcher};
pub use error::{DispatchError, RoutingError};
pub use factory::{create_router, Router, RouterRuntime};
pub use handle::{ConsumerReport, SinkHandle};
pub use matcher::{build_routing_table, LineMatcher};
pub use metrics::{DispatchMetrics, DispatchSnapshot, SinkMetrics};
pub use round_robin::RoundRobinDispatcher;
pub use sinks::{FileSink, FileSinkConfig, LogSink};
pub use table::{Route, RoutingTable, RoutingTableBuilder, WhenClause};
