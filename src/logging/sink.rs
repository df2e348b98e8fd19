//! Concrete destinations for formatted log records

use crate::logging::severity::Severity;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, trace, warn};

/// Destination a [`LogRouter`](crate::LogRouter) delivers formatted
/// records to.
///
/// Implementations receive lines already rendered by the router's format
/// template; they only persist or display them. The router serializes
/// calls, so implementations do not need internal ordering guarantees,
/// but they must be callable from pool threads (`Send + Sync`).
pub trait LogSink: Send + Sync + 'static {
    /// Persist one formatted record. `text` already carries any trailing
    /// newline the format template asked for.
    fn write(&self, severity: Severity, text: &str) -> io::Result<()>;

    /// Push buffered records to their destination.
    fn flush(&self) -> io::Result<()>;

    /// Discard displayed/accumulated records where the destination
    /// supports it. Destinations with nothing to clear return `Ok`.
    fn clear(&self) -> io::Result<()>;
}

/// Sink writing to standard error.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for ConsoleSink {
    fn write(&self, _severity: Severity, text: &str) -> io::Result<()> {
        io::stderr().write_all(text.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        io::stderr().flush()
    }

    fn clear(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink appending to a file through a buffered writer.
pub struct FileSink {
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    /// Open (or create) `path` for appending.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl LogSink for FileSink {
    fn write(&self, _severity: Severity, text: &str) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("log file writer poisoned"))?;
        writer.write_all(text.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("log file writer poisoned"))?;
        writer.flush()
    }

    fn clear(&self) -> io::Result<()> {
        // Appending file logs are never truncated by the router.
        Ok(())
    }
}

/// Sink forwarding records into the `tracing` diagnostics channel at the
/// matching level.
#[derive(Debug, Default)]
pub struct TraceSink;

impl TraceSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TraceSink {
    fn write(&self, severity: Severity, text: &str) -> io::Result<()> {
        let line = text.trim_end_matches(['\r', '\n']);
        match severity {
            Severity::Debug => trace!("{line}"),
            Severity::Info => debug!("{line}"),
            Severity::Warning => info!("{line}"),
            Severity::Error => warn!("{line}"),
            Severity::Fatal => error!("{line}"),
        }
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory sink that records every call, for assertions in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(Severity, String)>>,
    flushes: AtomicUsize,
    clears: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record written so far.
    pub fn records(&self) -> Vec<(Severity, String)> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of records written so far.
    pub fn record_count(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Number of [`LogSink::flush`] calls observed.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::Acquire)
    }

    /// Number of [`LogSink::clear`] calls observed.
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::Acquire)
    }
}

impl LogSink for MemorySink {
    fn write(&self, severity: Severity, text: &str) -> io::Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| io::Error::other("memory sink poisoned"))?;
        records.push((severity, text.to_string()));
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        self.flushes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        self.clears.fetch_add(1, Ordering::AcqRel);
        let mut records = self
            .records
            .lock()
            .map_err(|_| io::Error::other("memory sink poisoned"))?;
        records.clear();
        Ok(())
    }
}
