use std::sync::Arc;

use clap::Parser as _;
use curate::cli::Cli;
use curate::core::client::autoscaling::{resolve_group_name, IN_SERVICE_STATE};
use curate::core::client::{AWSAutoScaling, CloudWatchLogs};
use curate::core::cloud::InstanceIdentity;
use curate::core::config::Config;
use curate::core::retry::RetryPolicy;
use curate::server::setup_server;
use curate::types::params::WorkerParams;
use curate::utils::cloudwatch::{start_cloudwatch_logging, CloudWatchSink, LOG_GROUP};
use curate::utils::logging::init_logging;
use curate::worker::{JobConsumer, ProtectionCoordinator, ProtectionHandle};
use curate::{CurateError, CurateResult};
use dotenvy::dotenv;
use tracing::{error, info, warn};

/// Start the worker
#[tokio::main]
async fn main() {
    dotenv().ok();
    let log_sink = match init_logging() {
        Ok(sink) => sink,
        Err(e) => panic!("Failed to initialise logging: {}", e),
    };
    let cli = Cli::parse();
    info!("Starting curate");

    if let Err(e) = run_worker(cli, log_sink).await {
        error!(error = %e, error_chain = ?e, "Curate stopped");
        panic!("Curate stopped: {}", e);
    }
}

async fn run_worker(cli: Cli, log_sink: CloudWatchSink) -> CurateResult<()> {
    let params = WorkerParams::try_from(cli)?;

    let aws_config = aws_config::from_env().load().await;
    let identity = InstanceIdentity::discover(&aws_config, &params.metadata_url).await?;
    let aws_config = identity.regional_config(&aws_config);
    info!(account_id = %identity.account_id, region = %identity.region, instance_id = ?identity.instance_id, "Identity resolved");

    if let Some(instance_id) = &identity.instance_id {
        let logs = Box::new(CloudWatchLogs::new(&aws_config));
        let _shipper = start_cloudwatch_logging(logs, &log_sink, instance_id).await?;
        info!(group = LOG_GROUP, stream = %instance_id, "Shipping logs to CloudWatch");
    }

    let coordinator = match &identity.instance_id {
        Some(instance_id) => build_coordinator(&aws_config, instance_id).await,
        None => None,
    };

    let (_, mut server) = setup_server(&params.server).await?;

    let protection: Option<ProtectionHandle> = match coordinator {
        Some(coordinator) => {
            coordinator.wait_for_lifecycle_state(IN_SERVICE_STATE).await?;
            let (handle, _) = coordinator.spawn();
            Some(handle)
        }
        None => None,
    };

    let config = Arc::new(Config::setup(params, identity, &aws_config));
    let consumer = JobConsumer::new(config, protection);

    tokio::select! {
        served = &mut server => {
            let reason = match served {
                Ok(Ok(())) => "server exited".to_string(),
                Ok(Err(e)) => e.to_string(),
                Err(e) => e.to_string(),
            };
            Err(CurateError::ServerError(reason))
        }
        _ = consumer.run() => Ok(()),
    }
}

/// Protection is only managed for instances that belong to an auto scaling group
async fn build_coordinator(aws_config: &aws_config::SdkConfig, instance_id: &str) -> Option<ProtectionCoordinator> {
    let client = AWSAutoScaling::new(aws_config);
    match resolve_group_name(&client, instance_id, &RetryPolicy::default()).await {
        Ok(group_name) => {
            info!(group = %group_name, instance_id = %instance_id, "Instance belongs to auto scaling group");
            Some(ProtectionCoordinator::new(Box::new(client), group_name, instance_id))
        }
        Err(e) => {
            warn!(instance_id = %instance_id, error = %e, "No auto scaling group found, running without scale-in protection");
            None
        }
    }
}
