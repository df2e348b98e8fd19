//! Router configuration

use crate::errors::DispatchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format template applied when none is configured.
pub const DEFAULT_FORMAT: &str =
    "{dt:o},{severity},{host},{user},{prefix}{indent}{text}{suffix}{crlf}";

/// Formatting and delivery options for a [`LogRouter`](crate::LogRouter).
///
/// The `format` template supports these tokens, substituted per record:
/// `{text}`, `{severity}`, `{host}`, `{user}`, `{prefix}`, `{suffix}`,
/// `{indent}`, `{crlf}`, `{dt:s}` (sortable local timestamp), `{dt:d}`
/// (local date), `{dt:t}` (local time) and `{dt:o}` (UTC round-trip
/// timestamp). Unknown tokens pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Record template; see the type docs for the token set.
    pub format: String,
    /// Free text substituted for `{prefix}`.
    pub prefix: String,
    /// Free text substituted for `{suffix}`.
    pub suffix: String,
    /// Split multi-line input and format each line as its own record.
    pub split_lines: bool,
}

impl RouterConfig {
    /// Configuration with the default template, empty prefix/suffix and
    /// line splitting on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration carrying the given prefix and suffix.
    pub fn with_affixes(prefix: &str, suffix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            ..Self::default()
        }
    }

    /// Fails on an empty format template; every other combination is
    /// accepted.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.format.is_empty() {
            return Err(DispatchError::InvalidConfiguration {
                message: "RouterConfig format must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, DispatchError> {
        serde_json::to_string(self).map_err(|e| DispatchError::SerializationError {
            message: e.to_string(),
        })
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DispatchError> {
        serde_json::from_str(json).map_err(|e| DispatchError::DeserializationError {
            message: e.to_string(),
        })
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            prefix: String::new(),
            suffix: String::new(),
            split_lines: true,
        }
    }
}

impl fmt::Display for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RouterConfig:format={};prefix={};suffix={};split_lines={}",
            self.format, self.prefix, self.suffix, self.split_lines
        )
    }
}

impl FromStr for RouterConfig {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix("RouterConfig:")
            .ok_or_else(|| DispatchError::ParseError {
                message: format!("Invalid RouterConfig string: {s}"),
            })?;
        let mut config = RouterConfig::default();
        for field in body.split(';') {
            let Some((key, value)) = field.split_once('=') else {
                return Err(DispatchError::ParseError {
                    message: format!("Invalid RouterConfig field: {field}"),
                });
            };
            match key {
                "format" => config.format = value.to_string(),
                "prefix" => config.prefix = value.to_string(),
                "suffix" => config.suffix = value.to_string(),
                "split_lines" => {
                    config.split_lines = value.parse().map_err(|_| DispatchError::ParseError {
                        message: format!("Invalid split_lines value: {value}"),
                    })?;
                }
                _ => {
                    return Err(DispatchError::ParseError {
                        message: format!("Unknown RouterConfig field: {key}"),
                    });
                }
            }
        }
        config.validate()?;
        Ok(config)
    }
}
