//! OutputChannel - named, bounded hand-off to one consumer

use std::fmt::{self, Debug};

use contracts::{ChannelName, Record};
use tokio::sync::mpsc;
use tracing::trace;

use crate::cancel::CancelSignal;
use crate::error::DispatchError;

/// Producer side of a bounded FIFO queue of records
///
/// Created outside the dispatcher; the consumer keeps the receiver. The
/// dispatcher only ever enqueues.
pub struct OutputChannel<T> {
    name: ChannelName,
    tx: mpsc::Sender<Record<T>>,
}

impl<T> OutputChannel<T> {
    /// Wrap an existing sender
    pub fn new(name: impl Into<ChannelName>, tx: mpsc::Sender<Record<T>>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }

    /// Create a bounded channel, returning the consumer's receiver alongside
    ///
    /// # Panics
    /// When `capacity` is 0.
    pub fn bounded(
        name: impl Into<ChannelName>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<Record<T>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(name, tx), rx)
    }

    pub fn name(&self) -> &ChannelName {
        &self.name
    }

    /// Configured capacity
    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Free slots right now
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    /// Whether the consumer dropped its receiver
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Whether both handles feed the same queue
    pub fn same_channel(&self, other: &Self) -> bool {
        self.tx.same_channel(&other.tx)
    }
}

impl<T: Debug> OutputChannel<T> {
    /// Enqueue `record`, waiting for capacity
    ///
    /// A slot is reserved before the record is moved, so a cancelled put never
    /// enqueues anything. Cancellation wins over a simultaneously free slot,
    /// and an already fired signal fails without waiting.
    pub async fn put(&self, record: Record<T>, cancel: &CancelSignal) -> Result<(), DispatchError> {
        if cancel.is_cancelled() {
            return Err(DispatchError::cancelled(&self.name, &record));
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(DispatchError::cancelled(&self.name, &record));
            }
            permit = self.tx.reserve() => permit,
        };

        match permit {
            Ok(permit) => {
                trace!(channel = %self.name, record = ?record, "Record enqueued");
                permit.send(record);
                Ok(())
            }
            Err(_) => Err(DispatchError::channel_closed(&self.name, &record)),
        }
    }
}

// Manual impls: cloning a handle must not require `T: Clone`.
impl<T> Clone for OutputChannel<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<T> Debug for OutputChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputChannel")
            .field("name", &self.name)
            .field("max_capacity", &self.tx.max_capacity())
            .finish()
    }
}

/// Drop handles that feed an already listed queue, keeping first occurrence order
pub(crate) fn distinct<T>(channels: impl IntoIterator<Item = OutputChannel<T>>) -> Vec<OutputChannel<T>> {
    let mut unique: Vec<OutputChannel<T>> = Vec::new();
    for channel in channels {
        if !unique.iter().any(|seen| seen.same_channel(&channel)) {
            unique.push(channel);
        }
    }
    unique
}
