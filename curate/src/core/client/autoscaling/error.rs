use aws_sdk_autoscaling::error::SdkError;
use aws_sdk_autoscaling::operation::describe_auto_scaling_instances::DescribeAutoScalingInstancesError;
use aws_sdk_autoscaling::operation::set_instance_protection::SetInstanceProtectionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutoScalingError {
    #[error("Failed to describe auto scaling instance: {0}")]
    DescribeInstanceError(#[from] SdkError<DescribeAutoScalingInstancesError>),

    #[error("Failed to set instance protection: {0}")]
    SetInstanceProtectionError(#[from] SdkError<SetInstanceProtectionError>),

    #[error("Instance {0} is not part of an auto scaling group")]
    InstanceNotFound(String),

    #[error("Instance {instance_id} is in state {actual}, waiting for {expected}")]
    UnexpectedLifecycleState { instance_id: String, expected: String, actual: String },
}
