//! LogSink - logs each record via tracing

use std::fmt::Debug;

use contracts::{ContractError, RecordSink};
use tracing::{info, instrument};

/// Sink that logs every record it receives
pub struct LogSink {
    name: String,
    count: u64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
        }
    }
}

impl<T: Debug + Sync> RecordSink<T> for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_write", skip(self, record), fields(sink = %self.name))]
    async fn write(&mut self, record: &T) -> Result<(), ContractError> {
        self.count += 1;
        info!(sink = %self.name, seq = self.count, record = ?record, "Record received");
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, records = self.count, "LogSink closed");
        Ok(())
    }
}
