use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use mockall::predicate::eq;
use mockall::Sequence;
use rstest::rstest;
use tokio::time::Instant;

use crate::core::client::autoscaling::{
    resolve_group_name, AutoScalingError, AutoScalingInstance, MockAutoScalingClient, IN_SERVICE_STATE,
};
use crate::core::retry::RetryPolicy;
use crate::worker::protection::{ProtectionCoordinator, ProtectionError};

const GROUP: &str = "curate-workers";
const INSTANCE: &str = "i-0123456789abcdef0";

fn coordinator(client: MockAutoScalingClient) -> ProtectionCoordinator {
    ProtectionCoordinator::new(Box::new(client), GROUP, INSTANCE)
}

fn instance_in(state: &str) -> AutoScalingInstance {
    AutoScalingInstance {
        instance_id: INSTANCE.to_string(),
        group_name: GROUP.to_string(),
        lifecycle_state: state.to_string(),
    }
}

#[rstest]
#[tokio::test]
async fn test_protecting_twice_calls_autoscaler_once() {
    let mut client = MockAutoScalingClient::new();
    client
        .expect_set_instance_protection()
        .with(eq(GROUP), eq(INSTANCE), eq(true))
        .times(1)
        .returning(|_, _, _| Ok(()));

    let mut coordinator = coordinator(client);

    assert_matches!(coordinator.set(true).await, Ok(true));
    assert_matches!(coordinator.set(true).await, Ok(false));
    assert!(coordinator.is_protected());
}

#[rstest]
#[tokio::test]
async fn test_unprotecting_unprotected_instance_is_a_no_op() {
    let mut client = MockAutoScalingClient::new();
    client.expect_set_instance_protection().times(0);

    let mut coordinator = coordinator(client);

    assert_matches!(coordinator.set(false).await, Ok(false));
    assert!(!coordinator.is_protected());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_leave_state_unchanged() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let mut client = MockAutoScalingClient::new();
    client.expect_set_instance_protection().returning(move |_, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(AutoScalingError::InstanceNotFound(INSTANCE.to_string()))
    });

    let mut coordinator = coordinator(client);
    let start = Instant::now();

    let result = coordinator.set(true).await;

    assert_matches!(result, Err(ProtectionError::AutoScaling(AutoScalingError::InstanceNotFound(_))));
    assert!(!coordinator.is_protected());
    assert_eq!(calls.load(Ordering::SeqCst), 6);
    assert_eq!(start.elapsed(), Duration::from_secs(75));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_wait_for_lifecycle_state_polls_until_in_service() {
    let mut seq = Sequence::new();
    let mut client = MockAutoScalingClient::new();
    client
        .expect_describe_instance()
        .times(2)
        .in_sequence(&mut seq)
        .returning(|_| Ok(Some(instance_in("Pending"))));
    client
        .expect_describe_instance()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(Some(instance_in(IN_SERVICE_STATE))));

    let coordinator = coordinator(client);
    let start = Instant::now();

    coordinator.wait_for_lifecycle_state(IN_SERVICE_STATE).await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(15));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_wait_for_lifecycle_state_gives_up() {
    let mut client = MockAutoScalingClient::new();
    client.expect_describe_instance().times(6).returning(|_| Ok(Some(instance_in("Pending"))));

    let result = coordinator(client).wait_for_lifecycle_state(IN_SERVICE_STATE).await;

    assert_matches!(
        result,
        Err(ProtectionError::AutoScaling(AutoScalingError::UnexpectedLifecycleState { actual, .. })) if actual == "Pending"
    );
}

#[rstest]
#[tokio::test]
async fn test_spawned_coordinator_applies_requests_in_order() {
    let mut seq = Sequence::new();
    let mut client = MockAutoScalingClient::new();
    client
        .expect_set_instance_protection()
        .with(eq(GROUP), eq(INSTANCE), eq(true))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));
    client
        .expect_set_instance_protection()
        .with(eq(GROUP), eq(INSTANCE), eq(false))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));

    let (handle, _task) = coordinator(client).spawn();

    let protect = handle.request(true);
    let protect_again = handle.request(true);
    let unprotect = handle.request(false);

    assert!(protect.protected());
    assert_matches!(protect.wait().await, Ok(true));
    assert_matches!(protect_again.wait().await, Ok(false));
    assert_matches!(unprotect.wait().await, Ok(true));
}

#[rstest]
#[tokio::test]
async fn test_request_after_coordinator_stopped() {
    let (handle, task) = coordinator(MockAutoScalingClient::new()).spawn();
    task.abort();
    let _ = task.await;

    assert_matches!(handle.request(true).wait().await, Err(ProtectionError::CoordinatorClosed));
}

#[rstest]
#[tokio::test]
async fn test_group_name_resolved() {
    let mut client = MockAutoScalingClient::new();
    client
        .expect_describe_instance()
        .with(eq(INSTANCE))
        .times(1)
        .returning(|_| Ok(Some(instance_in(IN_SERVICE_STATE))));

    let group = resolve_group_name(&client, INSTANCE, &RetryPolicy::default()).await;

    assert_matches!(group, Ok(name) if name == GROUP);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_empty_group_name_is_not_found() {
    let mut client = MockAutoScalingClient::new();
    client.expect_describe_instance().times(3).returning(|_| {
        Ok(Some(AutoScalingInstance {
            instance_id: INSTANCE.to_string(),
            group_name: String::new(),
            lifecycle_state: String::new(),
        }))
    });

    let group = resolve_group_name(&client, INSTANCE, &RetryPolicy::new(2, Duration::from_secs(1))).await;

    assert_matches!(group, Err(AutoScalingError::InstanceNotFound(id)) if id == INSTANCE);
}
