use std::ffi::OsString;
use std::path::PathBuf;

use async_trait::async_trait;
use aws_config::sts::AssumeRoleProvider;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tokio::process::Command;

use crate::core::client::converter::manifest::ReportManifest;
use crate::core::client::converter::{AssumedRole, ConversionRequest, ConverterError, ReportConverter};
use crate::types::schema::TableSchema;

const ROLE_SESSION_NAME: &str = "curate";

/// Converts reports held in S3 by running the conversion engine binary.
///
/// Manifest reads happen in-process with the source role; the engine receives the whole
/// request on its command line and inherits the worker's environment.
#[derive(Clone, Debug)]
pub struct S3ReportConverter {
    aws_config: SdkConfig,
    engine: PathBuf,
}

impl S3ReportConverter {
    pub fn new(aws_config: &SdkConfig, engine: impl Into<PathBuf>) -> Self {
        Self { aws_config: aws_config.clone(), engine: engine.into() }
    }

    /// S3 client acting as `role` when set, as the worker otherwise
    async fn client_for(&self, role: Option<&AssumedRole>) -> Client {
        let Some(role) = role else {
            return Client::new(&self.aws_config);
        };

        let mut provider = AssumeRoleProvider::builder(role.role_arn.clone()).session_name(ROLE_SESSION_NAME);
        if let Some(external_id) = &role.external_id {
            provider = provider.external_id(external_id.clone());
        }
        let provider = provider.configure(&self.aws_config).build().await;

        let config = aws_sdk_s3::config::Builder::from(&self.aws_config).credentials_provider(provider).build();
        Client::from_conf(config)
    }

    async fn fetch_manifest(&self, request: &ConversionRequest) -> Result<Bytes, ConverterError> {
        let client = self.client_for(request.source_role.as_ref()).await;
        let output = client
            .get_object()
            .bucket(&request.source_bucket)
            .key(&request.manifest_key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    ConverterError::ManifestNotFound {
                        bucket: request.source_bucket.clone(),
                        key: request.manifest_key.clone(),
                    }
                } else {
                    ConverterError::FetchManifestError(e)
                }
            })?;

        let data = output.body.collect().await.map_err(|e| ConverterError::ManifestStreamError(e.to_string()))?;
        Ok(data.into_bytes())
    }
}

/// Command line handed to the conversion engine
pub fn engine_args(request: &ConversionRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--source-bucket".into(),
        request.source_bucket.clone().into(),
        "--manifest".into(),
        request.manifest_key.clone().into(),
        "--dest-bucket".into(),
        request.destination_bucket.clone().into(),
        "--dest-path".into(),
        request.destination_path.clone().into(),
    ];

    let mut push_role = |flag_arn: &str, flag_external_id: &str, role: &Option<AssumedRole>| {
        if let Some(role) = role {
            args.push(flag_arn.into());
            args.push(role.role_arn.clone().into());
            if let Some(external_id) = &role.external_id {
                args.push(flag_external_id.into());
                args.push(external_id.clone().into());
            }
        }
    };
    push_role("--source-role", "--source-external-id", &request.source_role);
    push_role("--dest-role", "--dest-external-id", &request.destination_role);

    if let Some(key) = &request.destination_kms_key {
        args.push("--dest-kms-key".into());
        args.push(key.clone().into());
    }
    if let Some(dir) = &request.scratch_dir {
        args.push("--tmp".into());
        args.push(dir.clone().into_os_string());
    }
    args
}

#[async_trait]
impl ReportConverter for S3ReportConverter {
    async fn check_manifest_exists(&self, request: &ConversionRequest) -> Result<(), ConverterError> {
        self.fetch_manifest(request).await.map(|_| ())
    }

    async fn convert(&self, request: &ConversionRequest) -> Result<(), ConverterError> {
        tracing::debug!(engine = %self.engine.display(), location = %request.destination_location(), "Starting conversion engine");

        let output = Command::new(&self.engine).args(engine_args(request)).kill_on_drop(true).output().await?;

        if !output.status.success() {
            return Err(ConverterError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    async fn columns(&self, request: &ConversionRequest) -> Result<TableSchema, ConverterError> {
        let data = self.fetch_manifest(request).await?;
        Ok(ReportManifest::parse(&data)?.table_schema())
    }
}
