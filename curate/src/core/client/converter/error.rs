use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("Manifest s3://{bucket}/{key} does not exist")]
    ManifestNotFound { bucket: String, key: String },

    #[error("Error fetching manifest: {0}")]
    FetchManifestError(#[from] SdkError<GetObjectError>),

    #[error("Failed to stream manifest: {0}")]
    ManifestStreamError(String),

    #[error("Manifest is not valid: {0}")]
    InvalidManifest(#[from] serde_json::Error),

    #[error("Failed to start conversion engine: {0}")]
    EngineSpawnError(#[from] std::io::Error),

    #[error("Conversion engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },
}

impl ConverterError {
    /// Whether the manifest is confirmed absent, as opposed to unreadable
    pub fn is_manifest_not_found(&self) -> bool {
        matches!(self, ConverterError::ManifestNotFound { .. })
    }
}
