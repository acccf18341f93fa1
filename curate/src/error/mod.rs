pub mod job;

use thiserror::Error;

use crate::core::client::logs::LogsError;
use crate::core::cloud::IdentityError;
use crate::worker::protection::ProtectionError;
pub use job::{JobError, ValidationError};

/// Result type for worker operations
pub type CurateResult<T> = Result<T, CurateError>;

/// Error types surfaced by the worker process
#[derive(Error, Debug)]
pub enum CurateError {
    #[error("Identity error: {0}")]
    IdentityError(#[from] IdentityError),

    #[error("Protection error: {0}")]
    ProtectionError(#[from] ProtectionError),

    /// CloudWatch log shipping could not be set up
    #[error("Log shipping error: {0}")]
    LogsError(#[from] LogsError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Health server error
    #[error("Health server error: {0}")]
    ServerError(String),

    /// Logging could not be initialised
    #[error("Logging setup error: {0}")]
    LoggingError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
