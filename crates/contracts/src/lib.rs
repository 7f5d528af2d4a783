//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the record router.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Record Model
//! - A stream carries [`Record::Data`] payloads terminated by [`Record::Poison`]
//! - Routing rules are [`Predicate`]s over the payload type
//! - Consumers drain output channels into [`RecordSink`]s

mod blueprint;
mod channel_name;
mod error;
mod predicate;
mod record;
mod sink;

pub use blueprint::*;
pub use channel_name::ChannelName;
pub use error::*;
pub use predicate::Predicate;
pub use record::Record;
pub use sink::*;
