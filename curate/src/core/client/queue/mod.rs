pub mod error;
pub mod sqs;

use async_trait::async_trait;
pub use error::QueueError;
use std::time::Duration;

/// Long-poll wait per receive call
pub const QUEUE_WAIT_TIME: Duration = Duration::from_secs(20);
/// Only one message is ever in flight per worker
pub const QUEUE_MAX_MESSAGES: i32 = 1;

/// A message received from the queue, detached from the SDK types
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueMessage {
    pub message_id: Option<String>,
    pub body: Option<String>,
    pub receipt_handle: Option<String>,
}

impl QueueMessage {
    pub fn new(message_id: impl Into<String>, body: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            body: Some(body.into()),
            receipt_handle: Some(receipt_handle.into()),
        }
    }

    /// Identifier used in logs, `-` when the queue did not supply one
    pub fn id(&self) -> &str {
        self.message_id.as_deref().unwrap_or("-")
    }
}

/// Trait defining queue operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Long-poll the queue, returning at most [`QUEUE_MAX_MESSAGES`] messages.
    /// An empty vector means the wait elapsed without a delivery.
    async fn receive_messages(&self) -> Result<Vec<QueueMessage>, QueueError>;

    /// Acknowledge a processed message so it is not redelivered
    async fn delete_message(&self, message: &QueueMessage) -> Result<(), QueueError>;
}
