//! Hub error types
//!
//! None of these are fatal: the ingestion path logs and absorbs them, and
//! the WebSocket path closes only the affected connection.

use thiserror::Error;

use super::topic::Topic;

/// Errors raised while admitting or serving a connection
#[derive(Error, Debug)]
pub enum HubError {
    /// Connection limit reached
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    /// The connection's outbound channel is closed
    #[error("Failed to send message")]
    SendFailed,

    /// Message could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by state store mutations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The topic's snapshot has no counter with this name
    #[error("Topic {topic} has no counter named '{field}'")]
    UnknownCounter { topic: Topic, field: String },

    /// The topic's snapshot does not support the requested operation
    #[error("Topic {topic} does not support {operation}")]
    Unsupported {
        topic: Topic,
        operation: &'static str,
    },

    /// A replacement or merged value does not fit the topic's snapshot shape
    #[error("Invalid snapshot for {topic}: {error}")]
    Shape { topic: Topic, error: String },
}

/// Result type alias for hub operations
pub type HubResult<T> = Result<T, HubError>;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HubError::TooManyConnections(2);
        assert_eq!(err.to_string(), "Too many connections (limit: 2)");

        let err = StoreError::UnknownCounter {
            topic: Topic::Timer,
            field: "current".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Topic timer has no counter named 'current'"
        );
    }
}
