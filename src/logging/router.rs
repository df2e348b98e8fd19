//! Formatting and routing of log records to a sink

use crate::errors::DispatchError;
use crate::logging::config::RouterConfig;
use crate::logging::hook::{self, PanicLogger};
use crate::logging::severity::Severity;
use crate::logging::sink::LogSink;
use crate::queue::{DispatchQueue, Priority, PriorityFifo};
use crate::utils;
use chrono::{Local, SecondsFormat, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, trace, warn};

/// Bound on the shutdown drain of the async write queue.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Formats log records and delivers them to a [`LogSink`], either
/// synchronously on the calling thread or through an internal
/// [`DispatchQueue`].
///
/// Construction registers a process-wide panic hook (shared and
/// reference-counted across routers) so uncaught panics are captured once
/// as `Error` records. [`LogRouter::dispose`], also run on drop, performs
/// a bounded shutdown: new async writes stop, the queue is given up to the
/// configured timeout to drain, any residue is traced, and the sink is
/// flushed exactly once.
///
/// Nothing here propagates errors to the caller: a sink failure while
/// writing one multi-line record aborts only the remaining lines of that
/// call and is traced.
///
/// # Examples
///
/// ```
/// use dispatchq::{ConsoleSink, LogRouter, Severity};
/// use std::sync::Arc;
///
/// let router = LogRouter::new(Arc::new(ConsoleSink::new()));
/// router.info("service started");
/// router.log(Severity::Warning, "low disk space");
/// ```
pub struct LogRouter {
    core: Arc<RouterCore>,
    hook_token: u64,
    shutdown_timeout: Duration,
}

struct RouterCore {
    sink: Arc<dyn LogSink>,
    config: RouterConfig,
    host_name: String,
    user_name: String,
    async_io: AtomicBool,
    disposed: AtomicBool,
    // Diagnostics from this queue go to `tracing` only, never back
    // through a router, so a failing sink cannot recurse.
    queue: DispatchQueue<PriorityFifo>,
}

impl LogRouter {
    /// Router with the default configuration, writing synchronously.
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self::build(sink, RouterConfig::default())
    }

    /// Router with an explicit configuration.
    pub fn with_config(
        sink: Arc<dyn LogSink>,
        config: RouterConfig,
    ) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self::build(sink, config))
    }

    fn build(sink: Arc<dyn LogSink>, config: RouterConfig) -> Self {
        let core = Arc::new(RouterCore {
            sink,
            config,
            host_name: utils::host_name(),
            user_name: utils::user_name(),
            async_io: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            queue: DispatchQueue::new("log-router.write", PriorityFifo::new()),
        });
        let weak = Arc::downgrade(&core) as std::sync::Weak<dyn PanicLogger>;
        let hook_token = hook::register(weak);
        Self {
            core,
            hook_token,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Replace the default 30 second shutdown drain bound.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Route writes through the internal queue (`true`) or straight to
    /// the sink on the calling thread (`false`, the default).
    pub fn set_async_io(&self, enabled: bool) {
        self.core.async_io.store(enabled, Ordering::Release);
    }

    /// Whether writes currently ride the internal queue.
    pub fn async_io(&self) -> bool {
        self.core.async_io.load(Ordering::Acquire)
    }

    /// Format and deliver a record.
    pub fn log(&self, severity: Severity, text: &str) {
        self.core.log(severity, "", text);
    }

    /// Format and deliver a record with an explicit `{indent}` value.
    pub fn log_indented(&self, severity: Severity, indent: &str, text: &str) {
        self.core.log(severity, indent, text);
    }

    pub fn debug(&self, text: &str) {
        self.log(Severity::Debug, text);
    }

    pub fn info(&self, text: &str) {
        self.log(Severity::Info, text);
    }

    pub fn warning(&self, text: &str) {
        self.log(Severity::Warning, text);
    }

    pub fn error(&self, text: &str) {
        self.log(Severity::Error, text);
    }

    pub fn fatal(&self, text: &str) {
        self.log(Severity::Fatal, text);
    }

    /// Flush the sink; rides the queue in async mode so it lands after
    /// every record already accepted.
    pub fn flush(&self) {
        self.core.flush();
    }

    /// Clear the sink; rides the queue in async mode.
    pub fn clear(&self) {
        self.core.clear();
    }

    /// Number of formatted records still waiting in the async queue.
    pub fn pending_records(&self) -> usize {
        self.core.queue.queue_length()
    }

    /// Bounded shutdown: stop accepting writes, drain the async queue for
    /// at most the configured timeout, flush the sink once, release the
    /// panic hook. Idempotent; also runs on drop.
    ///
    /// Returns the number of records abandoned in the queue, zero on a
    /// clean drain.
    pub fn dispose(&self) -> usize {
        if self.core.disposed.swap(true, Ordering::AcqRel) {
            return 0;
        }
        self.core.async_io.store(false, Ordering::Release);
        let remaining = self.core.queue.wait_until_empty(self.shutdown_timeout);
        if remaining > 0 {
            warn!(remaining, "log records abandoned at router shutdown");
        }
        self.core.queue.close();
        if let Err(e) = self.core.sink.flush() {
            error!(error = %e, "final sink flush failed");
        }
        hook::unregister(self.hook_token);
        remaining
    }
}

impl Drop for LogRouter {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl RouterCore {
    fn log(&self, severity: Severity, indent: &str, text: &str) {
        if self.disposed.load(Ordering::Acquire) {
            trace!("log record dropped: router is disposed");
            return;
        }
        let lines: Vec<&str> = if self.config.split_lines {
            text.split(['\r', '\n']).filter(|l| !l.is_empty()).collect()
        } else {
            vec![text]
        };
        for line in lines {
            let rendered = self.render(severity, indent, line);
            if self.async_io.load(Ordering::Acquire) {
                let sink = Arc::clone(&self.sink);
                self.queue.enqueue(
                    (severity, rendered),
                    move |(severity, line): (Severity, String)| {
                        if let Err(e) = sink.write(severity, &line) {
                            error!(error = %e, "async sink write failed");
                        }
                    },
                    Priority::Normal,
                );
            } else if let Err(e) = self.sink.write(severity, &rendered) {
                error!(error = %e, "sink write failed; remaining lines of this record dropped");
                break;
            }
        }
    }

    /// Substitute the format tokens for one line. `{text}` goes last so
    /// tokens inside the message body are never expanded.
    fn render(&self, severity: Severity, indent: &str, line: &str) -> String {
        let local = Local::now();
        let utc = Utc::now();
        self.config
            .format
            .replace("{dt:s}", &local.format("%Y-%m-%dT%H:%M:%S").to_string())
            .replace("{dt:d}", &local.format("%Y-%m-%d").to_string())
            .replace("{dt:t}", &local.format("%H:%M:%S").to_string())
            .replace("{dt:o}", &utc.to_rfc3339_opts(SecondsFormat::Micros, true))
            .replace("{severity}", severity.label())
            .replace("{host}", &self.host_name)
            .replace("{user}", &self.user_name)
            .replace("{prefix}", &self.config.prefix)
            .replace("{suffix}", &self.config.suffix)
            .replace("{indent}", indent)
            .replace("{crlf}", "\n")
            .replace("{text}", line)
    }

    fn flush(&self) {
        if self.async_io.load(Ordering::Acquire) {
            let sink = Arc::clone(&self.sink);
            self.queue.enqueue(
                (),
                move |_| {
                    if let Err(e) = sink.flush() {
                        error!(error = %e, "async sink flush failed");
                    }
                },
                Priority::Normal,
            );
        } else if let Err(e) = self.sink.flush() {
            error!(error = %e, "sink flush failed");
        }
    }

    fn clear(&self) {
        if self.async_io.load(Ordering::Acquire) {
            let sink = Arc::clone(&self.sink);
            self.queue.enqueue(
                (),
                move |_| {
                    if let Err(e) = sink.clear() {
                        error!(error = %e, "async sink clear failed");
                    }
                },
                Priority::Normal,
            );
        } else if let Err(e) = self.sink.clear() {
            error!(error = %e, "sink clear failed");
        }
    }
}

impl PanicLogger for RouterCore {
    fn log_panic(&self, message: &str) {
        self.log(Severity::Error, "", message);
    }
}
