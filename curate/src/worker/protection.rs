//! Scale-in protection of the instance the worker runs on.
//!
//! The coordinator owns the protection flag. Once spawned it runs as a task that applies
//! requests one at a time, in the order they were sent, so a protect and a later unprotect can
//! never race each other.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::core::client::autoscaling::{AutoScalingClient, AutoScalingError};
use crate::core::retry::RetryPolicy;

#[derive(Error, Debug)]
pub enum ProtectionError {
    #[error("Auto Scaling call failed: {0}")]
    AutoScaling(#[from] AutoScalingError),

    #[error("Protection coordinator is no longer running")]
    CoordinatorClosed,
}

pub struct ProtectionCoordinator {
    client: Box<dyn AutoScalingClient>,
    group_name: String,
    instance_id: String,
    retry: RetryPolicy,
    protected: bool,
}

impl ProtectionCoordinator {
    /// A coordinator for an instance that starts out unprotected
    pub fn new(client: Box<dyn AutoScalingClient>, group_name: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            client,
            group_name: group_name.into(),
            instance_id: instance_id.into(),
            retry: RetryPolicy::default(),
            protected: false,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    /// Moves the instance to the requested protection state.
    ///
    /// Returns `Ok(false)` without calling the autoscaler when the instance is already in that
    /// state. When every attempt fails the flag keeps its previous value.
    pub async fn set(&mut self, protected: bool) -> Result<bool, ProtectionError> {
        if self.protected == protected {
            tracing::debug!(protected, "Instance protection already in requested state");
            return Ok(false);
        }

        let client = self.client.as_ref();
        let group_name = self.group_name.as_str();
        let instance_id = self.instance_id.as_str();
        self.retry
            .retry("set_instance_protection", || async move {
                client.set_instance_protection(group_name, instance_id, protected).await
            })
            .await?;

        self.protected = protected;
        tracing::info!(group = %self.group_name, instance_id = %self.instance_id, protected, "Instance protection updated");
        Ok(true)
    }

    /// Polls the autoscaler until the instance reports `target` as its lifecycle state.
    pub async fn wait_for_lifecycle_state(&self, target: &str) -> Result<(), ProtectionError> {
        let client = self.client.as_ref();
        let instance_id = self.instance_id.as_str();
        self.retry
            .retry("wait_for_lifecycle_state", || async move {
                match client.describe_instance(instance_id).await? {
                    Some(instance) if instance.lifecycle_state == target => Ok(()),
                    Some(instance) => Err(AutoScalingError::UnexpectedLifecycleState {
                        instance_id: instance_id.to_string(),
                        expected: target.to_string(),
                        actual: instance.lifecycle_state,
                    }),
                    None => Err(AutoScalingError::InstanceNotFound(instance_id.to_string())),
                }
            })
            .await?;

        tracing::info!(instance_id = %self.instance_id, state = %target, "Instance reached lifecycle state");
        Ok(())
    }

    /// Runs the coordinator as a task. The task ends once every handle is dropped.
    ///
    /// # Returns
    /// * `ProtectionHandle` - Cloneable sender used to queue protect and unprotect requests.
    /// * `JoinHandle<()>` - The coordinator task.
    pub fn spawn(mut self) -> (ProtectionHandle, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<ProtectionRequest>();

        let task = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let result = self.set(request.protected).await;
                if let Err(e) = &result {
                    tracing::error!(
                        group = %self.group_name,
                        instance_id = %self.instance_id,
                        protected = request.protected,
                        error = %e,
                        "Failed to update instance protection"
                    );
                }
                // nobody waiting on a detached ticket
                let _ = request.reply.send(result);
            }
            tracing::debug!("Protection coordinator stopped");
        });

        (ProtectionHandle { sender }, task)
    }
}

struct ProtectionRequest {
    protected: bool,
    reply: oneshot::Sender<Result<bool, ProtectionError>>,
}

/// Cheap handle used to queue protection changes on a spawned coordinator
#[derive(Clone, Debug)]
pub struct ProtectionHandle {
    sender: mpsc::UnboundedSender<ProtectionRequest>,
}

impl ProtectionHandle {
    /// Queues a change without waiting for it. The returned ticket resolves once it was applied.
    pub fn request(&self, protected: bool) -> ProtectionTicket {
        let (reply, receiver) = oneshot::channel();
        if self.sender.send(ProtectionRequest { protected, reply }).is_err() {
            tracing::warn!(protected, "Protection coordinator is gone, request dropped");
        }
        ProtectionTicket { protected, receiver }
    }
}

/// Outcome of one queued protection change
#[derive(Debug)]
pub struct ProtectionTicket {
    protected: bool,
    receiver: oneshot::Receiver<Result<bool, ProtectionError>>,
}

impl ProtectionTicket {
    /// The state this ticket asked for
    pub fn protected(&self) -> bool {
        self.protected
    }

    /// `Ok(true)` when the autoscaler was called, `Ok(false)` when nothing had to change
    pub async fn wait(self) -> Result<bool, ProtectionError> {
        self.receiver.await.unwrap_or(Err(ProtectionError::CoordinatorClosed))
    }
}
