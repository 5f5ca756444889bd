//! Error types for redis-key-analyzer
//!
//! This module defines the error hierarchy that covers:
//! - Redis connection and protocol errors
//! - Configuration and CLI errors
//! - Report rendering errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include context about what to do
//! - Preserve error chains for debugging
//!
//! Two outcomes are deliberately *not* errors: a key that vanished between
//! SCAN and the metadata fetch (dropped by the aggregator), and the read-only
//! gate refusing a primary (reported as `AnalyzeOutcome::Aborted`).

use thiserror::Error;

/// Top-level error type for the analyzer
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Redis-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Report rendering errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Redis connection and protocol errors
///
/// None of these are retried: a failed batch ends the run.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Could not open a connection
    #[error("Failed to connect to Redis at '{url}': {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// A command or script invocation failed
    #[error("Redis command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// The server answered with something we cannot interpret
    #[error("Malformed reply to '{command}': {reason}")]
    MalformedReply { command: String, reason: String },
}

impl StoreError {
    /// Wrap a redis client error raised while running `command`
    pub fn command(command: &str, err: redis::RedisError) -> Self {
        StoreError::CommandFailed {
            command: command.to_string(),
            reason: err.to_string(),
        }
    }

    /// Check if this error happened before any data was read
    pub fn is_connect_error(&self) -> bool {
        matches!(self, StoreError::ConnectionFailed { .. })
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid batch size
    #[error("Invalid batch size {size}: must be between {min} and {max}")]
    InvalidBatchSize { size: usize, min: usize, max: usize },

    /// Separator given as an empty string
    #[error("Invalid separator: must not be empty (use --no-separator to disable the separator rule)")]
    EmptySeparator,

    /// Separator depth of zero
    #[error("Invalid separator depth {depth}: must be at least 1")]
    InvalidSeparatorDepth { depth: usize },

    /// Empty MATCH glob
    #[error("Invalid match pattern: must not be empty (use '*' to scan every key)")]
    EmptyMatchPattern,

    /// Port zero
    #[error("Invalid port {port}")]
    InvalidPort { port: u16 },

    /// NaN or infinite inter-batch delay
    #[error("Invalid sleep value {value}: must be a finite number of seconds")]
    InvalidSleep { value: String },
}

/// Report rendering errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// Writing to the output stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for AnalyzerError
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Result type alias for StoreError
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for ReportError
pub type ReportResult<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_connect() {
        let err = StoreError::ConnectionFailed {
            url: "redis://localhost:6379/".into(),
            reason: "refused".into(),
        };
        assert!(err.is_connect_error());

        let err = StoreError::MalformedReply {
            command: "EVALSHA".into(),
            reason: "cursor".into(),
        };
        assert!(!err.is_connect_error());
    }

    #[test]
    fn test_error_conversion() {
        let store_err = StoreError::CommandFailed {
            command: "SELECT".into(),
            reason: "ERR DB index is out of range".into(),
        };
        let err: AnalyzerError = store_err.into();
        assert!(matches!(err, AnalyzerError::Store(_)));

        let err: AnalyzerError = ConfigError::EmptySeparator.into();
        assert!(matches!(err, AnalyzerError::Config(ConfigError::EmptySeparator)));

        // Output failures reach the top level through the report layer
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: AnalyzerError = ReportError::from(io).into();
        assert!(matches!(err, AnalyzerError::Report(ReportError::Io(_))));
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::InvalidBatchSize {
            size: 0,
            min: 1,
            max: 100_000,
        };
        assert_eq!(
            err.to_string(),
            "Invalid batch size 0: must be between 1 and 100000"
        );
    }
}
