use clap::Parser;

pub mod converter;
pub mod provider;
pub mod queue;
pub mod server;
pub mod storage;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "curate",
    version,
    about = "Curate - cost and usage report conversion worker",
    long_about = "Curate consumes report conversion jobs from an SQS queue, converts the monthly cost and usage \
    report to a columnar layout and publishes the result as an Athena table.\n\n\
    While a job is in flight the instance is protected from auto scaling scale-in.",
    after_help = "Examples:\n  \
    curate --sqsqueue https://sqs.us-east-1.amazonaws.com/111111111111/curate-jobs\n  \
    curate --sqsqueue <url> --destpathprefix parquet-cur --healthport 8080"
)]
pub struct Cli {
    #[clap(flatten, next_help_heading = "Queue")]
    pub aws_sqs_args: queue::aws_sqs::AWSSQSCliArgs,

    #[clap(flatten, next_help_heading = "Storage")]
    pub storage_args: storage::StorageCliArgs,

    #[clap(flatten, next_help_heading = "Health server")]
    pub server_args: server::ServerCliArgs,

    #[clap(flatten, next_help_heading = "Conversion")]
    pub converter_args: converter::ConverterCliArgs,

    #[clap(flatten, next_help_heading = "AWS")]
    pub aws_config_args: provider::aws::AWSConfigCliArgs,
}
