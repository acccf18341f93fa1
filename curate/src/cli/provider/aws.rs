use clap::Args;

use crate::core::cloud::INSTANCE_IDENTITY_URL;

/// Parameters used to config AWS.
#[derive(Debug, Clone, Args)]
pub struct AWSConfigCliArgs {
    /// Instance identity document endpoint.
    #[arg(env = "CURATE_METADATA_URL", long = "metadata-url", default_value = INSTANCE_IDENTITY_URL)]
    pub metadata_url: String,
}
