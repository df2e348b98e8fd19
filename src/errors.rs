use std::fmt::{Debug, Display, Formatter, Result};

/// Represents errors that can occur while configuring or operating the
/// dispatch framework.
///
/// Nothing on the enqueue/dispatch hot path returns these to a producer;
/// they surface only at construction time and from explicit serialization
/// helpers.
///
/// # Examples
///
/// ```
/// use dispatchq::DispatchError;
///
/// let error = DispatchError::InvalidConfiguration {
///     message: "worker pool requires at least one thread".to_string(),
/// };
/// assert!(error.to_string().contains("at least one thread"));
/// ```
pub enum DispatchError {
    /// Error that occurs when parsing fails with a specific message.
    ///
    /// This variant is used when string conversion of priorities, severities
    /// or router configurations fails.
    ParseError {
        /// Descriptive message explaining the parsing failure
        message: String,
    },

    /// Error indicating a construction parameter is unusable.
    ///
    /// Raised when a component is built with parameters that can never work,
    /// such as a zero-thread worker pool or an empty log format template.
    InvalidConfiguration {
        /// Explanation of why the configuration is invalid
        message: String,
    },

    /// Error raised when an operating-system thread could not be spawned.
    ThreadSpawn {
        /// Descriptive message with the spawn failure details
        message: String,
    },

    /// Error raised when serialization of a configuration fails.
    SerializationError {
        /// Descriptive message with the serialization failure details
        message: String,
    },

    /// Error raised when deserialization of a configuration fails.
    DeserializationError {
        /// Descriptive message with the deserialization failure details
        message: String,
    },
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DispatchError::ParseError { message } => write!(f, "{message}"),
            DispatchError::InvalidConfiguration { message } => {
                write!(f, "Invalid configuration: {message}")
            }
            DispatchError::ThreadSpawn { message } => {
                write!(f, "Thread spawn failed: {message}")
            }
            DispatchError::SerializationError { message } => {
                write!(f, "Serialization error: {message}")
            }
            DispatchError::DeserializationError { message } => {
                write!(f, "Deserialization error: {message}")
            }
        }
    }
}

impl Debug for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DispatchError::ParseError { message } => write!(f, "{message}"),
            DispatchError::InvalidConfiguration { message } => {
                write!(f, "Invalid configuration: {message}")
            }
            DispatchError::ThreadSpawn { message } => {
                write!(f, "Thread spawn failed: {message}")
            }
            DispatchError::SerializationError { message } => {
                write!(f, "Serialization error: {message}")
            }
            DispatchError::DeserializationError { message } => {
                write!(f, "Deserialization error: {message}")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

#[cfg(test)]
mod tests {
    use crate::errors::DispatchError;
    use std::error::Error;

    #[test]
    fn test_parse_error_display() {
        let error = DispatchError::ParseError {
            message: "Failed to parse".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to parse");
    }

    #[test]
    fn test_invalid_configuration_display() {
        let error = DispatchError::InvalidConfiguration {
            message: "zero levels".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid configuration: zero levels");
    }

    #[test]
    fn test_thread_spawn_display() {
        let error = DispatchError::ThreadSpawn {
            message: "os limit".to_string(),
        };
        assert_eq!(error.to_string(), "Thread spawn failed: os limit");
    }

    #[test]
    fn test_serialization_error_display() {
        let error = DispatchError::SerializationError {
            message: "bad value".to_string(),
        };
        assert_eq!(error.to_string(), "Serialization error: bad value");
    }

    #[test]
    fn test_debug_matches_display() {
        let errors = [
            DispatchError::ParseError {
                message: "Debug test".to_string(),
            },
            DispatchError::InvalidConfiguration {
                message: "Debug config".to_string(),
            },
            DispatchError::ThreadSpawn {
                message: "Debug spawn".to_string(),
            },
            DispatchError::SerializationError {
                message: "Debug ser".to_string(),
            },
            DispatchError::DeserializationError {
                message: "Debug de".to_string(),
            },
        ];

        for error in &errors {
            assert_eq!(format!("{error:?}"), error.to_string());
        }
    }

    #[test]
    fn test_implements_error_trait() {
        let error = DispatchError::ParseError {
            message: "x".to_string(),
        };
        let _: &dyn Error = &error;
        assert!(error.source().is_none());
    }
}
