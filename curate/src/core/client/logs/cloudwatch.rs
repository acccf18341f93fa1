use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudwatchlogs::types::InputLogEvent;
use aws_sdk_cloudwatchlogs::Client;

use crate::core::client::logs::{LogLine, LogsClient, LogsError};

#[derive(Clone, Debug)]
pub struct CloudWatchLogs {
    client: Client,
}

impl CloudWatchLogs {
    pub fn new(aws_config: &SdkConfig) -> Self {
        Self { client: Client::new(aws_config) }
    }
}

#[async_trait]
impl LogsClient for CloudWatchLogs {
    async fn create_log_group(&self, group: &str) -> Result<(), LogsError> {
        match self.client.create_log_group().log_group_name(group).send().await {
            Ok(_) => Ok(()),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_resource_already_exists_exception()) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn create_log_stream(&self, group: &str, stream: &str) -> Result<(), LogsError> {
        match self.client.create_log_stream().log_group_name(group).log_stream_name(stream).send().await {
            Ok(_) => Ok(()),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_resource_already_exists_exception()) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn put_log_events(&self, group: &str, stream: &str, lines: Vec<LogLine>) -> Result<(), LogsError> {
        let events = lines
            .into_iter()
            .map(|line| {
                InputLogEvent::builder()
                    .timestamp(line.timestamp)
                    .message(line.message)
                    .build()
                    .map_err(|e| LogsError::InvalidLogEvent(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.client
            .put_log_events()
            .log_group_name(group)
            .log_stream_name(stream)
            .set_log_events(Some(events))
            .send()
            .await?;
        Ok(())
    }
}
