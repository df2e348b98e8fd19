//! Log record formatting and routing on top of the dispatch framework

mod config;
mod hook;
mod router;
mod severity;
mod sink;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_FORMAT, RouterConfig};
pub use router::LogRouter;
pub use severity::Severity;
pub use sink::{ConsoleSink, FileSink, LogSink, MemorySink, TraceSink};
