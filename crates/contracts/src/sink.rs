//! RecordSink trait - consumer output interface
//!
//! A sink receives the data records drained from one output channel.

use crate::ContractError;

/// Record output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink<T> {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one data record
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, record: &T) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
