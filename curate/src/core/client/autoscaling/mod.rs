pub mod asg;
pub mod error;

use async_trait::async_trait;
pub use error::AutoScalingError;

use crate::core::retry::RetryPolicy;

/// Lifecycle state an instance must reach before it may be protected
pub const IN_SERVICE_STATE: &str = "InService";

/// What the autoscaler reports about one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoScalingInstance {
    pub instance_id: String,
    pub group_name: String,
    pub lifecycle_state: String,
}

/// Trait defining the Auto Scaling operations the worker needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AutoScalingClient: Send + Sync {
    /// Describe a single instance, `None` when the instance belongs to no group
    async fn describe_instance(&self, instance_id: &str) -> Result<Option<AutoScalingInstance>, AutoScalingError>;

    /// Mark or unmark the instance as protected from scale-in
    async fn set_instance_protection(
        &self,
        group_name: &str,
        instance_id: &str,
        protected: bool,
    ) -> Result<(), AutoScalingError>;
}

/// Resolves the auto scaling group an instance belongs to, retrying until the autoscaler knows it.
pub async fn resolve_group_name(
    client: &dyn AutoScalingClient,
    instance_id: &str,
    retry: &RetryPolicy,
) -> Result<String, AutoScalingError> {
    retry
        .retry("describe_auto_scaling_instance", || async move {
            match client.describe_instance(instance_id).await? {
                Some(instance) if !instance.group_name.is_empty() => Ok(instance.group_name),
                _ => Err(AutoScalingError::InstanceNotFound(instance_id.to_string())),
            }
        })
        .await
}
