//! Unified error types for RaidWatch.

use thiserror::Error;

/// Result type alias using RaidWatchError.
pub type Result<T> = std::result::Result<T, RaidWatchError>;

#[derive(Error, Debug)]
pub enum RaidWatchError {
    // Config errors — fatal at startup, the loop is never entered.
    #[error("Configuration error: {0}")]
    Config(String),

    // Notifier sink errors — recovered locally, retried on the next tick.
    #[error("Sink error: {0}")]
    Sink(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RaidWatchError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RaidWatchError::Sink("webhook 429".into());
        assert!(err.to_string().contains("webhook 429"));
    }

    #[test]
    fn test_error_constructors() {
        let e1 = RaidWatchError::config("bad time");
        assert!(matches!(e1, RaidWatchError::Config(_)));

        let e2 = RaidWatchError::sink("unreachable");
        assert!(matches!(e2, RaidWatchError::Sink(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RaidWatchError = io_err.into();
        assert!(matches!(err, RaidWatchError::Io(_)));
    }
}
