use std::sync::Arc;

use tracing::{debug, error, info, warn, Instrument};

use crate::core::client::queue::{QueueError, QueueMessage};
use crate::core::config::Config;
use crate::error::JobError;
use crate::types::job::Job;
use crate::worker::processor::{ConvertedReport, ReportProcessor};
use crate::worker::protection::{ProtectionHandle, ProtectionTicket};

/// Result of handling one received message
#[derive(Debug)]
pub struct MessageOutcome {
    pub message_id: String,
    pub result: Result<ConvertedReport, JobError>,
}

impl MessageOutcome {
    /// Whether the message was processed and deleted from the queue
    pub fn acknowledged(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of one receive-and-process iteration
#[derive(Debug)]
pub enum PollOutcome {
    /// The receive call failed; the next poll starts right away
    ReceiveFailed(QueueError),
    /// The long-poll elapsed without a delivery
    NoMessage,
    /// At least one message was received and handled
    Processed {
        outcomes: Vec<MessageOutcome>,
        protect: Option<ProtectionTicket>,
        unprotect: Option<ProtectionTicket>,
    },
}

/// Consumes report conversion jobs from the queue, one message at a time.
pub struct JobConsumer {
    config: Arc<Config>,
    protection: Option<ProtectionHandle>,
}

impl JobConsumer {
    pub fn new(config: Arc<Config>, protection: Option<ProtectionHandle>) -> Self {
        Self { config, protection }
    }

    /// Polls forever. Protection tickets are not awaited; the coordinator logs failed changes.
    pub async fn run(&self) {
        info!(queue = %self.config.params().queue_url, "Waiting for jobs");
        loop {
            match self.poll_once().await {
                PollOutcome::ReceiveFailed(e) => warn!(error = %e, "Could not receive from queue, retrying"),
                PollOutcome::NoMessage => debug!("No message received"),
                PollOutcome::Processed { outcomes, .. } => {
                    let acknowledged = outcomes.iter().filter(|o| o.acknowledged()).count();
                    debug!(received = outcomes.len(), acknowledged, "Batch finished");
                }
            }
        }
    }

    /// Receives once and handles whatever arrived, bracketed by a protect and an unprotect request.
    pub async fn poll_once(&self) -> PollOutcome {
        let messages = match self.config.queue().receive_messages().await {
            Ok(messages) => messages,
            Err(e) => return PollOutcome::ReceiveFailed(e),
        };
        if messages.is_empty() {
            return PollOutcome::NoMessage;
        }

        let protect = self.protection.as_ref().map(|handle| handle.request(true));

        let mut outcomes = Vec::with_capacity(messages.len());
        for message in &messages {
            let result = self.handle_message(message).await;
            outcomes.push(MessageOutcome { message_id: message.id().to_string(), result });
        }

        let unprotect = self.protection.as_ref().map(|handle| handle.request(false));

        PollOutcome::Processed { outcomes, protect, unprotect }
    }

    async fn handle_message(&self, message: &QueueMessage) -> Result<ConvertedReport, JobError> {
        let job = match message.body.as_deref().ok_or(JobError::EmptyMessage).and_then(Job::from_message_body) {
            Ok(job) => job,
            Err(e) => {
                error!(message_id = %message.id(), error = %e, "Could not decode job, leaving message on queue");
                return Err(e);
            }
        };

        let span = tracing::info_span!(
            "job",
            message_id = %message.id(),
            report = %job.report_id(),
            bucket = %job.source_bucket,
        );

        async {
            info!("Processing job");
            let result = self.process(message, &job).await;
            match &result {
                Ok(report) => info!(period = %report.period.period_tag(), "Job complete, message deleted"),
                Err(e) => error!(error = %e, "Job failed, leaving message for redelivery"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn process(&self, message: &QueueMessage, job: &Job) -> Result<ConvertedReport, JobError> {
        let report = ReportProcessor::new(&self.config).run(job).await?;
        self.config.queue().delete_message(message).await?;
        Ok(report)
    }
}
