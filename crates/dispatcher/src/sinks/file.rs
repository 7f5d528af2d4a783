//! FileSink - appends one line per record to a file

use std::collections::HashMap;
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use contracts::{ContractError, RecordSink};
use tracing::{debug, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output file, created with its parent directories
    pub path: PathBuf,
    /// Truncate instead of appending
    pub truncate: bool,
}

impl FileSinkConfig {
    /// Create config from params map
    ///
    /// Requires `path`; `truncate = "true"` overwrites an existing file.
    pub fn from_params(params: &HashMap<String, String>) -> io::Result<Self> {
        let path = params.get("path").map(PathBuf::from).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "file sink requires a 'path' param")
        })?;
        let truncate = params.get("truncate").is_some_and(|v| v == "true");
        Ok(Self { path, truncate })
    }
}

/// Sink that writes records as text lines
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writer: BufWriter<File>,
    lines: u64,
}

impl FileSink {
    /// Create a new FileSink, opening the file immediately
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!config.truncate)
            .truncate(config.truncate)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            config,
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params)?)
    }

    pub fn path(&self) -> &PathBuf {
        &self.config.path
    }
}

impl<T: Display + Sync> RecordSink<T> for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "file_sink_write", skip(self, record), fields(sink = %self.name))]
    async fn write(&mut self, record: &T) -> Result<(), ContractError> {
        writeln!(self.writer, "{record}")
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        self.lines += 1;
        Ok(())
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer.flush()?;
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.writer.flush()?;
        debug!(
            sink = %self.name,
            path = %self.config.path.display(),
            lines = self.lines,
            "FileSink closed"
        );
        Ok(())
    }
}
