use crate::core::client::queue::{QueueClient, QueueError, QueueMessage, QUEUE_MAX_MESSAGES, QUEUE_WAIT_TIME};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::Client;

#[derive(Clone, Debug)]
pub struct SQS {
    client: Client,
    queue_url: String,
}

impl SQS {
    /// Creates a new SQS client bound to a single queue.
    /// # Arguments
    /// * `aws_config` - The AWS configuration.
    /// * `queue_url` - URL of the job queue.
    pub fn new(aws_config: &SdkConfig, queue_url: impl Into<String>) -> Self {
        let sqs_config_builder = aws_sdk_sqs::config::Builder::from(aws_config);
        Self { client: Client::from_conf(sqs_config_builder.build()), queue_url: queue_url.into() }
    }
}

#[async_trait]
impl QueueClient for SQS {
    async fn receive_messages(&self) -> Result<Vec<QueueMessage>, QueueError> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(QUEUE_MAX_MESSAGES)
            .wait_time_seconds(QUEUE_WAIT_TIME.as_secs() as i32)
            .send()
            .await?;

        let messages = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|message| QueueMessage {
                message_id: message.message_id,
                body: message.body,
                receipt_handle: message.receipt_handle,
            })
            .collect::<Vec<_>>();

        tracing::trace!(queue_url = %self.queue_url, count = messages.len(), "Receive call returned");
        Ok(messages)
    }

    async fn delete_message(&self, message: &QueueMessage) -> Result<(), QueueError> {
        let receipt_handle =
            message.receipt_handle.as_deref().ok_or_else(|| QueueError::MissingReceiptHandle(message.id().to_string()))?;

        self.client.delete_message().queue_url(&self.queue_url).receipt_handle(receipt_handle).send().await?;
        Ok(())
    }
}
