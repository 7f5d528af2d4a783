//! Dispatcher error types

use std::fmt::Debug;

use contracts::ChannelName;
use thiserror::Error;

/// Failure to enqueue a record into a selected channel
///
/// A record that matches no route and has no default channel is not an
/// error; dispatch returns `Ok(())` for it.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Cancellation fired while waiting for channel capacity
    #[error("unable to put record {record} in channel '{channel}': dispatch cancelled")]
    Cancelled { channel: ChannelName, record: String },

    /// The consumer dropped its receiver
    #[error("unable to put record {record} in channel '{channel}': channel closed")]
    ChannelClosed { channel: ChannelName, record: String },
}

impl DispatchError {
    /// Create a cancellation error
    pub fn cancelled(channel: &ChannelName, record: &impl Debug) -> Self {
        Self::Cancelled {
            channel: channel.clone(),
            record: format!("{record:?}"),
        }
    }

    /// Create a closed-channel error
    pub fn channel_closed(channel: &ChannelName, record: &impl Debug) -> Self {
        Self::ChannelClosed {
            channel: channel.clone(),
            record: format!("{record:?}"),
        }
    }

    /// Channel the record was headed for
    pub fn channel(&self) -> &ChannelName {
        match self {
            Self::Cancelled { channel, .. } | Self::ChannelClosed { channel, .. } => channel,
        }
    }

    /// Debug rendering of the record that was not delivered
    pub fn record(&self) -> &str {
        match self {
            Self::Cancelled { record, .. } | Self::ChannelClosed { record, .. } => record,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Short label for metrics
    pub(crate) fn reason(&self) -> &'static str {
        match self {
            Self::Cancelled { .. } => "cancelled",
            Self::ChannelClosed { .. } => "closed",
        }
    }
}

/// Routing table construction errors
#[derive(Debug, Error)]
pub enum RoutingError {
    /// `otherwise` was given more than once
    #[error("routing table already has default channel '{existing}', cannot add '{rejected}'")]
    DuplicateDefault {
        existing: ChannelName,
        rejected: ChannelName,
    },

    /// A route or the default names a channel that was not provided
    #[error("unknown channel '{0}'")]
    UnknownChannel(String),

    /// A configured matcher could not be compiled
    #[error("invalid matcher for channel '{channel}': {message}")]
    InvalidMatcher { channel: String, message: String },

    /// A configured channel cannot hold any record
    #[error("channel '{channel}' has capacity 0")]
    InvalidCapacity { channel: String },

    /// The consumer of a configured channel could not be created
    #[error("cannot create sink for channel '{channel}': {message}")]
    SinkSetup { channel: String, message: String },
}
