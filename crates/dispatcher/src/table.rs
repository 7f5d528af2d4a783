//! RoutingTable - ordered content routes plus an optional fallback
//!
//! Built once, then read-only: dispatchers only ever borrow it.

use std::fmt;

use contracts::{ChannelName, Predicate};
use tracing::warn;

use crate::channel::{distinct, OutputChannel};
use crate::error::RoutingError;

/// One `predicate -> channel` entry
pub struct Route<T> {
    predicate: Box<dyn Predicate<T>>,
    channel: OutputChannel<T>,
}

impl<T> Route<T> {
    pub fn new(predicate: impl Predicate<T> + 'static, channel: OutputChannel<T>) -> Self {
        Self {
            predicate: Box::new(predicate),
            channel,
        }
    }

    #[inline]
    pub fn matches(&self, record: &T) -> bool {
        self.predicate.matches(record)
    }

    pub fn channel(&self) -> &OutputChannel<T> {
        &self.channel
    }
}

/// Ordered routes evaluated first-match-wins, then the default channel
pub struct RoutingTable<T> {
    routes: Vec<Route<T>>,
    default: Option<OutputChannel<T>>,
}

impl<T> RoutingTable<T> {
    pub fn new(routes: Vec<Route<T>>, default: Option<OutputChannel<T>>) -> Self {
        if routes.is_empty() && default.is_none() {
            warn!("Routing table has no channels, every record will be dropped");
        }
        Self { routes, default }
    }

    /// Start a `when(..).dispatch_to(..)` chain
    pub fn builder() -> RoutingTableBuilder<T> {
        RoutingTableBuilder::default()
    }

    pub fn routes(&self) -> &[Route<T>] {
        &self.routes
    }

    pub fn default_channel(&self) -> Option<&OutputChannel<T>> {
        self.default.as_ref()
    }

    /// First route matching `record`, ignoring the default
    pub fn matching_route(&self, record: &T) -> Option<&Route<T>> {
        self.routes.iter().find(|route| route.matches(record))
    }

    /// Channel a data record would be enqueued into, `None` means dropped
    pub fn select(&self, record: &T) -> Option<&OutputChannel<T>> {
        self.matching_route(record)
            .map(Route::channel)
            .or(self.default.as_ref())
    }

    /// Every distinct channel referenced: routes in order, then the default
    pub fn channels(&self) -> Vec<OutputChannel<T>> {
        distinct(
            self.routes
                .iter()
                .map(|route| route.channel.clone())
                .chain(self.default.iter().cloned()),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.default.is_none()
    }
}

impl<T> fmt::Debug for RoutingTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes: Vec<&ChannelName> = self.routes.iter().map(|r| r.channel.name()).collect();
        f.debug_struct("RoutingTable")
            .field("routes", &routes)
            .field("default", &self.default.as_ref().map(OutputChannel::name))
            .finish()
    }
}

/// Fluent builder for [`RoutingTable`]
///
/// ```
/// use dispatcher::{OutputChannel, RoutingTable};
///
/// let (even, _even_rx) = OutputChannel::bounded("even", 8);
/// let (rest, _rest_rx) = OutputChannel::bounded("rest", 8);
///
/// let table = RoutingTable::<i64>::builder()
///     .when(|n: &i64| n % 2 == 0)
///     .dispatch_to(even)
///     .otherwise(rest)
///     .build()
///     .unwrap();
/// assert_eq!(table.select(&4).unwrap().name(), "even");
/// assert_eq!(table.select(&5).unwrap().name(), "rest");
/// ```
pub struct RoutingTableBuilder<T> {
    routes: Vec<Route<T>>,
    default: Option<OutputChannel<T>>,
    rejected_default: Option<ChannelName>,
}

impl<T> Default for RoutingTableBuilder<T> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            default: None,
            rejected_default: None,
        }
    }
}

impl<T> RoutingTableBuilder<T> {
    /// Begin a route; finish it with [`WhenClause::dispatch_to`]
    pub fn when(self, predicate: impl Predicate<T> + 'static) -> WhenClause<T> {
        WhenClause {
            builder: self,
            predicate: Box::new(predicate),
        }
    }

    /// Append a complete route
    pub fn route(mut self, predicate: impl Predicate<T> + 'static, channel: OutputChannel<T>) -> Self {
        self.routes.push(Route::new(predicate, channel));
        self
    }

    /// Set the channel for records no route matches
    ///
    /// Only one default is allowed; a second call makes [`build`](Self::build) fail.
    pub fn otherwise(mut self, channel: OutputChannel<T>) -> Self {
        if self.default.is_some() {
            self.rejected_default.get_or_insert_with(|| channel.name().clone());
        } else {
            self.default = Some(channel);
        }
        self
    }

    pub fn build(self) -> Result<RoutingTable<T>, RoutingError> {
        if let (Some(existing), Some(rejected)) = (&self.default, self.rejected_default) {
            return Err(RoutingError::DuplicateDefault {
                existing: existing.name().clone(),
                rejected,
            });
        }
        Ok(RoutingTable::new(self.routes, self.default))
    }
}

/// Pending route awaiting its destination
pub struct WhenClause<T> {
    builder: RoutingTableBuilder<T>,
    predicate: Box<dyn Predicate<T>>,
}

impl<T> WhenClause<T> {
    pub fn dispatch_to(self, channel: OutputChannel<T>) -> RoutingTableBuilder<T> {
        let mut builder = self.builder;
        builder.routes.push(Route {
            predicate: self.predicate,
            channel,
        });
        builder
    }
}
