use aws_sdk_sqs::error::SdkError;
use aws_sdk_sqs::operation::delete_message::DeleteMessageError;
use aws_sdk_sqs::operation::receive_message::ReceiveMessageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Failed to receive message: {0}")]
    ReceiveMessageError(#[from] SdkError<ReceiveMessageError>),

    #[error("Failed to delete message: {0}")]
    DeleteMessageError(#[from] SdkError<DeleteMessageError>),

    #[error("Message {0} has no receipt handle")]
    MissingReceiptHandle(String),
}
