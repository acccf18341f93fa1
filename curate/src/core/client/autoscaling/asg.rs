use crate::core::client::autoscaling::{AutoScalingClient, AutoScalingError, AutoScalingInstance};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_autoscaling::types::AutoScalingInstanceDetails;
use aws_sdk_autoscaling::Client;

#[derive(Clone, Debug)]
pub struct AWSAutoScaling {
    client: Client,
}

impl AWSAutoScaling {
    pub fn new(aws_config: &SdkConfig) -> Self {
        Self { client: Client::new(aws_config) }
    }
}

/// Missing group or state come back empty; callers treat an empty group as "no group" and an
/// empty state as not yet in the target state.
fn instance_from_details(instance_id: &str, details: &AutoScalingInstanceDetails) -> AutoScalingInstance {
    AutoScalingInstance {
        instance_id: instance_id.to_string(),
        group_name: details.auto_scaling_group_name().unwrap_or_default().to_string(),
        lifecycle_state: details.lifecycle_state().unwrap_or_default().to_string(),
    }
}

#[async_trait]
impl AutoScalingClient for AWSAutoScaling {
    async fn describe_instance(&self, instance_id: &str) -> Result<Option<AutoScalingInstance>, AutoScalingError> {
        let output =
            self.client.describe_auto_scaling_instances().instance_ids(instance_id).max_records(1).send().await?;

        Ok(output.auto_scaling_instances().first().map(|details| instance_from_details(instance_id, details)))
    }

    async fn set_instance_protection(
        &self,
        group_name: &str,
        instance_id: &str,
        protected: bool,
    ) -> Result<(), AutoScalingError> {
        self.client
            .set_instance_protection()
            .auto_scaling_group_name(group_name)
            .instance_ids(instance_id)
            .protected_from_scale_in(protected)
            .send()
            .await?;
        Ok(())
    }
}
