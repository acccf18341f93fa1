pub mod cloudwatch;
pub mod error;

use async_trait::async_trait;
pub use error::LogsError;

/// One formatted log line waiting to be shipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Milliseconds since the epoch
    pub timestamp: i64,
    pub message: String,
}

/// Remote log storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogsClient: Send + Sync {
    /// Creates the group, succeeding when it already exists
    async fn create_log_group(&self, group: &str) -> Result<(), LogsError>;

    /// Creates the stream, succeeding when it already exists
    async fn create_log_stream(&self, group: &str, stream: &str) -> Result<(), LogsError>;

    /// Appends lines to a stream. Lines must be in timestamp order.
    async fn put_log_events(&self, group: &str, stream: &str, lines: Vec<LogLine>) -> Result<(), LogsError>;
}
