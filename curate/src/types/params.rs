use std::path::PathBuf;

use crate::cli::Cli;
use crate::types::billing::ManifestFallback;
use crate::CurateError;

/// Where the health server listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerParams {
    pub host: String,
    pub port: u16,
}

/// Plain-value worker settings derived from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerParams {
    pub queue_url: String,
    pub destination_prefix: String,
    pub scratch_dir: PathBuf,
    pub converter_bin: PathBuf,
    pub manifest_fallback: ManifestFallback,
    pub metadata_url: String,
    pub server: ServerParams,
}

impl TryFrom<Cli> for WorkerParams {
    type Error = CurateError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if cli.aws_sqs_args.queue_url.trim().is_empty() {
            return Err(CurateError::ConfigError("Provide valid SQS Queue URL".to_string()));
        }
        if cli.storage_args.dest_path_prefix.trim().is_empty() {
            return Err(CurateError::ConfigError("Provide valid Destination Path".to_string()));
        }

        Ok(Self {
            queue_url: cli.aws_sqs_args.queue_url,
            destination_prefix: cli.storage_args.dest_path_prefix,
            scratch_dir: cli.storage_args.scratch_dir,
            converter_bin: cli.converter_args.converter_bin,
            manifest_fallback: ManifestFallback::new(cli.converter_args.manifest_grace_days),
            metadata_url: cli.aws_config_args.metadata_url,
            server: ServerParams { host: cli.server_args.host, port: cli.server_args.port },
        })
    }
}
