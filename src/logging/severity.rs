//! Log record severity levels

use crate::errors::DispatchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Diagnostic detail, normally filtered out.
    #[serde(rename(serialize = "DEBUG"))]
    #[serde(alias = "debug", alias = "Debug", alias = "DEBUG")]
    Debug,
    /// Routine operational messages.
    #[serde(rename(serialize = "INFO"))]
    #[serde(alias = "info", alias = "Info", alias = "INFO")]
    Info,
    /// Something unexpected but recoverable.
    #[serde(rename(serialize = "WARNING"))]
    #[serde(alias = "warning", alias = "Warning", alias = "WARNING")]
    Warning,
    /// An operation failed.
    #[serde(rename(serialize = "ERROR"))]
    #[serde(alias = "error", alias = "Error", alias = "ERROR")]
    Error,
    /// The process cannot continue.
    #[serde(rename(serialize = "FATAL"))]
    #[serde(alias = "fatal", alias = "Fatal", alias = "FATAL")]
    Fatal,
}

impl Severity {
    /// Fixed-width (5 character) column label used by the `{severity}`
    /// format token, so records line up regardless of level.
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO ",
            Severity::Warning => "WARN ",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "DEBUG"),
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

impl FromStr for Severity {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "ERROR" => Ok(Severity::Error),
            "FATAL" => Ok(Severity::Fatal),
            _ => Err(DispatchError::ParseError {
                message: format!("Invalid Severity: {s}"),
            }),
        }
    }
}
