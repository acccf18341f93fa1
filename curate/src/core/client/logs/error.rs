use aws_sdk_cloudwatchlogs::error::SdkError;
use aws_sdk_cloudwatchlogs::operation::create_log_group::CreateLogGroupError;
use aws_sdk_cloudwatchlogs::operation::create_log_stream::CreateLogStreamError;
use aws_sdk_cloudwatchlogs::operation::put_log_events::PutLogEventsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogsError {
    #[error("Failed to create log group: {0}")]
    CreateLogGroupError(#[from] SdkError<CreateLogGroupError>),

    #[error("Failed to create log stream: {0}")]
    CreateLogStreamError(#[from] SdkError<CreateLogStreamError>),

    #[error("Failed to put log events: {0}")]
    PutLogEventsError(#[from] SdkError<PutLogEventsError>),

    #[error("Invalid log event: {0}")]
    InvalidLogEvent(String),
}
