pub mod error;
pub mod manifest;
pub mod s3;

use std::path::PathBuf;

use async_trait::async_trait;
pub use error::ConverterError;

use crate::types::schema::TableSchema;

/// Cross account role assumed for bucket access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumedRole {
    pub role_arn: String,
    pub external_id: Option<String>,
}

impl AssumedRole {
    pub fn new(role_arn: impl Into<String>, external_id: Option<String>) -> Self {
        Self { role_arn: role_arn.into(), external_id }
    }
}

/// Everything the conversion engine needs to convert one month of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source_bucket: String,
    pub manifest_key: String,
    pub destination_bucket: String,
    pub destination_path: String,
    pub source_role: Option<AssumedRole>,
    pub destination_role: Option<AssumedRole>,
    pub destination_kms_key: Option<String>,
    pub scratch_dir: Option<PathBuf>,
}

impl ConversionRequest {
    pub fn new(
        source_bucket: impl Into<String>,
        manifest_key: impl Into<String>,
        destination_bucket: impl Into<String>,
        destination_path: impl Into<String>,
    ) -> Self {
        Self {
            source_bucket: source_bucket.into(),
            manifest_key: manifest_key.into(),
            destination_bucket: destination_bucket.into(),
            destination_path: destination_path.into(),
            source_role: None,
            destination_role: None,
            destination_kms_key: None,
            scratch_dir: None,
        }
    }

    pub fn with_source_role(mut self, role: AssumedRole) -> Self {
        self.source_role = Some(role);
        self
    }

    pub fn with_destination_role(mut self, role: AssumedRole) -> Self {
        self.destination_role = Some(role);
        self
    }

    pub fn with_destination_kms_key(mut self, key: impl Into<String>) -> Self {
        self.destination_kms_key = Some(key.into());
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn set_manifest_key(&mut self, manifest_key: impl Into<String>) {
        self.manifest_key = manifest_key.into();
    }

    pub fn set_destination_path(&mut self, destination_path: impl Into<String>) {
        self.destination_path = destination_path.into();
    }

    /// `s3://{bucket}/{path}/`, the location the catalog table points at
    pub fn destination_location(&self) -> String {
        format!("s3://{}/{}/", self.destination_bucket, self.destination_path)
    }
}

/// The report conversion engine. Opaque to the worker apart from these three calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportConverter: Send + Sync {
    /// Confirms the manifest exists; absence is [`ConverterError::ManifestNotFound`]
    async fn check_manifest_exists(&self, request: &ConversionRequest) -> Result<(), ConverterError>;

    /// Performs the conversion
    async fn convert(&self, request: &ConversionRequest) -> Result<(), ConverterError>;

    /// Column list of the converted report, valid after a successful [`ReportConverter::convert`]
    async fn columns(&self, request: &ConversionRequest) -> Result<TableSchema, ConverterError>;
}
