use clap::Args;

/// Parameters used to config AWS SQS.
#[derive(Debug, Clone, Args)]
pub struct AWSSQSCliArgs {
    /// SQS URL for processing.
    #[arg(env = "CURATE_SQS_QUEUE_URL", long = "sqsqueue", value_name = "URL")]
    pub queue_url: String,
}
