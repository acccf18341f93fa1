use thiserror::Error;

use crate::core::client::catalog::CatalogError;
use crate::core::client::converter::ConverterError;
use crate::core::client::queue::QueueError;

/// Problems with a job that will recur identically on every delivery.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Must supply a {0}")]
    MissingField(&'static str),

    #[error("Could not parse given date override {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },
}

/// Failure of a single job. The message stays on the queue for redelivery.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Failed to decode message job: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error("Message has no body")]
    EmptyMessage,

    #[error("Invalid job: {0}")]
    Validation(#[from] ValidationError),

    #[error("Manifest {manifest_key} not found and day {day_of_month} is past the {grace_days} day grace window")]
    ManifestDelayed { manifest_key: String, day_of_month: u32, grace_days: u32 },

    #[error("Could not convert report: {0}")]
    Conversion(#[from] ConverterError),

    #[error("Failed to create/update catalog table: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Failed to delete message from queue: {0}")]
    Acknowledge(#[from] QueueError),
}
