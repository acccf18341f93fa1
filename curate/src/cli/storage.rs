use clap::Args;

/// Parameters describing where converted reports and scratch files go.
#[derive(Debug, Clone, Args)]
pub struct StorageCliArgs {
    /// Top level destination path.
    #[arg(env = "CURATE_DEST_PATH_PREFIX", long = "destpathprefix", default_value = "parquet-cur")]
    pub dest_path_prefix: String,

    /// Directory to store temporary files used during conversion.
    #[arg(env = "CURATE_SCRATCH_DIR", long = "tmp", default_value = "/tmp")]
    pub scratch_dir: std::path::PathBuf,
}
