// Client abstractions module - one trait per remote collaborator, each with an AWS implementation

pub mod autoscaling;
pub mod catalog;
pub mod converter;
pub mod logs;
pub mod queue;

// Re-export commonly used types
pub use autoscaling::{asg::AWSAutoScaling, AutoScalingClient};
pub use catalog::{athena::Athena, glue::Glue, CatalogClient, QueryClient};
pub use converter::{s3::S3ReportConverter, ReportConverter};
pub use logs::{cloudwatch::CloudWatchLogs, LogsClient};
pub use queue::{sqs::SQS, QueueClient};
