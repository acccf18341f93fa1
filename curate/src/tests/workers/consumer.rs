use std::time::Duration;

use assert_matches::assert_matches;
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::json;

use crate::core::client::autoscaling::{AutoScalingError, MockAutoScalingClient};
use crate::core::client::catalog::{CatalogError, MockCatalogClient};
use crate::core::client::converter::{ConverterError, MockReportConverter};
use crate::core::client::queue::{MockQueueClient, QueueError};
use crate::core::retry::RetryPolicy;
use crate::error::{JobError, ValidationError};
use crate::tests::common::{date, job_body, permissive_catalog, queue_message, report_schema, TestConfigBuilder};
use crate::worker::consumer::{JobConsumer, PollOutcome};
use crate::worker::protection::{ProtectionCoordinator, ProtectionError};

fn queue_delivering(body: String, deletes: usize) -> MockQueueClient {
    let mut queue = MockQueueClient::new();
    queue.expect_receive_messages().times(1).returning(move || Ok(vec![queue_message(body.clone())]));
    queue.expect_delete_message().times(deletes).returning(|_| Ok(()));
    queue
}

fn not_found(bucket: &str, key: &str) -> ConverterError {
    ConverterError::ManifestNotFound { bucket: bucket.to_string(), key: key.to_string() }
}

fn single_outcome(outcome: PollOutcome) -> Result<crate::worker::ConvertedReport, JobError> {
    match outcome {
        PollOutcome::Processed { mut outcomes, .. } => {
            assert_eq!(outcomes.len(), 1);
            outcomes.remove(0).result
        }
        other => panic!("expected a processed batch, got {:?}", other),
    }
}

#[rstest]
#[tokio::test]
async fn test_missing_manifest_early_in_month_falls_back_to_previous_month() {
    let mut converter = MockReportConverter::new();
    converter
        .expect_check_manifest_exists()
        .withf(|request| request.manifest_key == "cur/hourly/20240301-20240401/hourly-Manifest.json")
        .times(1)
        .returning(|request| Err(not_found(&request.source_bucket, &request.manifest_key)));
    converter
        .expect_convert()
        .withf(|request| {
            request.manifest_key == "cur/hourly/20240201-20240301/hourly-Manifest.json"
                && request.destination_path == "parquet-cur/cur/hourly/202402"
                && request.source_bucket == "billing-src"
                && request.destination_bucket == "billing-dst"
        })
        .times(1)
        .returning(|_| Ok(()));
    converter.expect_columns().times(1).returning(|_| Ok(report_schema()));

    let (queries, _) = permissive_catalog();
    let mut catalog = MockCatalogClient::new();
    catalog.expect_get_table().with(eq("cur"), eq("hourly_202402")).times(1).returning(|_, _| Ok(()));
    catalog
        .expect_update_columns()
        .withf(|database, table, _| database == "cur" && table == "hourly_202402")
        .times(1)
        .returning(|_, _, _| Ok(()));

    let config = TestConfigBuilder::new()
        .today(date(2024, 3, 2))
        .queue(queue_delivering(job_body(json!({})), 1))
        .converter(converter)
        .queries(queries)
        .catalog(catalog)
        .build();

    let report = single_outcome(JobConsumer::new(config, None).poll_once().await).unwrap();

    assert_eq!(report.period.period_tag(), "20240201-20240301");
    assert_eq!(report.period.partition_tag(), "202402");
    assert_eq!(report.location(), "s3://billing-dst/parquet-cur/cur/hourly/202402/");
}

#[rstest]
#[tokio::test]
async fn test_job_without_source_bucket_is_rejected_before_remote_calls() {
    let config = TestConfigBuilder::new()
        .queue(queue_delivering(job_body(json!({ "source_bucket": "" })), 0))
        .build();

    let result = single_outcome(JobConsumer::new(config, None).poll_once().await);

    assert_matches!(result, Err(JobError::Validation(ValidationError::MissingField("source bucket"))));
}

#[rstest]
#[tokio::test]
async fn test_malformed_body_is_left_on_queue() {
    let config = TestConfigBuilder::new().queue(queue_delivering("{\"source_bucket\": ".to_string(), 0)).build();

    let result = single_outcome(JobConsumer::new(config, None).poll_once().await);

    assert_matches!(result, Err(JobError::MalformedMessage(_)));
}

#[rstest]
#[tokio::test]
async fn test_invalid_date_override_is_a_validation_error() {
    let config =
        TestConfigBuilder::new().queue(queue_delivering(job_body(json!({ "date": "2024-03-02" })), 0)).build();

    let result = single_outcome(JobConsumer::new(config, None).poll_once().await);

    assert_matches!(result, Err(JobError::Validation(ValidationError::InvalidDate { .. })));
}

#[rstest]
#[tokio::test]
async fn test_missing_manifest_after_grace_window_fails_without_fallback() {
    let mut converter = MockReportConverter::new();
    converter
        .expect_check_manifest_exists()
        .times(1)
        .returning(|request| Err(not_found(&request.source_bucket, &request.manifest_key)));
    converter.expect_convert().times(0);

    let config = TestConfigBuilder::new()
        .today(date(2024, 3, 4))
        .queue(queue_delivering(job_body(json!({})), 0))
        .converter(converter)
        .build();

    let result = single_outcome(JobConsumer::new(config, None).poll_once().await);

    assert_matches!(
        result,
        Err(JobError::ManifestDelayed { manifest_key, day_of_month: 4, grace_days: 3 })
            if manifest_key == "cur/hourly/20240301-20240401/hourly-Manifest.json"
    );
}

#[rstest]
#[tokio::test]
async fn test_other_manifest_errors_do_not_trigger_fallback() {
    let mut converter = MockReportConverter::new();
    converter
        .expect_check_manifest_exists()
        .times(1)
        .returning(|_| Err(ConverterError::ManifestStreamError("connection reset".to_string())));
    converter.expect_convert().times(0);

    let config = TestConfigBuilder::new()
        .today(date(2024, 3, 1))
        .queue(queue_delivering(job_body(json!({})), 0))
        .converter(converter)
        .build();

    let result = single_outcome(JobConsumer::new(config, None).poll_once().await);

    assert_matches!(result, Err(JobError::Conversion(ConverterError::ManifestStreamError(_))));
}

#[rstest]
#[tokio::test]
async fn test_date_override_and_roles_reach_the_converter() {
    let mut converter = MockReportConverter::new();
    converter.expect_check_manifest_exists().times(1).returning(|_| Ok(()));
    converter
        .expect_convert()
        .withf(|request| {
            request.manifest_key == "reports/daily/20240101-20240201/daily-Manifest.json"
                && request.destination_path == "parquet-cur/billing/daily/202401"
                && request.source_role.as_ref().map(|r| r.role_arn.as_str()) == Some("arn:aws:iam::1:role/read")
                && request.destination_role.as_ref().map(|r| r.role_arn.as_str()) == Some("arn:aws:iam::2:role/write")
                && request.destination_role.as_ref().and_then(|r| r.external_id.as_deref()) == Some("ext-dst")
                && request.destination_kms_key.as_deref() == Some("arn:aws:kms:us-east-1:2:key/k")
        })
        .times(1)
        .returning(|_| Ok(()));
    converter.expect_columns().times(1).returning(|_| Ok(report_schema()));
    let (queries, catalog) = permissive_catalog();

    let body = job_body(json!({
        "cur_report_descriptor": "daily",
        "report_path": "reports/daily",
        "report_name": "daily",
        "cur_database": "billing",
        "date": "20240115",
        "source_role_arn": "arn:aws:iam::1:role/read",
        "destination_role_arn": "arn:aws:iam::2:role/write",
        "destination_external_id": "ext-dst",
        "destination_kms_key_arn": "arn:aws:kms:us-east-1:2:key/k",
    }));
    let config = TestConfigBuilder::new()
        .queue(queue_delivering(body, 1))
        .converter(converter)
        .queries(queries)
        .catalog(catalog)
        .build();

    let report = single_outcome(JobConsumer::new(config, None).poll_once().await).unwrap();

    assert_eq!(report.period.partition_tag(), "202401");
}

#[rstest]
#[tokio::test]
async fn test_catalog_failure_leaves_message_on_queue() {
    let mut converter = MockReportConverter::new();
    converter.expect_check_manifest_exists().returning(|_| Ok(()));
    converter.expect_convert().returning(|_| Ok(()));
    converter.expect_columns().returning(|_| Ok(report_schema()));
    let (queries, _) = permissive_catalog();
    let mut catalog = MockCatalogClient::new();
    catalog.expect_get_table().returning(|_, _| Ok(()));
    catalog
        .expect_update_columns()
        .returning(|_, _, _| Err(CatalogError::InvalidTableDefinition("no storage descriptor".to_string())));

    let config = TestConfigBuilder::new()
        .queue(queue_delivering(job_body(json!({})), 0))
        .converter(converter)
        .queries(queries)
        .catalog(catalog)
        .build();

    let result = single_outcome(JobConsumer::new(config, None).poll_once().await);

    assert_matches!(result, Err(JobError::Catalog(CatalogError::InvalidTableDefinition(_))));
}

#[rstest]
#[tokio::test]
async fn test_receive_failure_and_empty_poll() {
    let mut queue = MockQueueClient::new();
    let mut calls = 0;
    queue.expect_receive_messages().times(2).returning(move || {
        calls += 1;
        if calls == 1 {
            Err(QueueError::MissingReceiptHandle("msg-0".to_string()))
        } else {
            Ok(vec![])
        }
    });
    let mut autoscaling = MockAutoScalingClient::new();
    autoscaling.expect_set_instance_protection().times(0);
    let (handle, _task) = ProtectionCoordinator::new(Box::new(autoscaling), "group", "i-1").spawn();

    let consumer = JobConsumer::new(TestConfigBuilder::new().queue(queue).build(), Some(handle));

    assert_matches!(consumer.poll_once().await, PollOutcome::ReceiveFailed(_));
    assert_matches!(consumer.poll_once().await, PollOutcome::NoMessage);
}

#[rstest]
#[tokio::test]
async fn test_batch_is_bracketed_by_protection_requests() {
    let mut autoscaling = MockAutoScalingClient::new();
    let mut seq = mockall::Sequence::new();
    autoscaling
        .expect_set_instance_protection()
        .with(eq("group"), eq("i-1"), eq(true))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));
    autoscaling
        .expect_set_instance_protection()
        .with(eq("group"), eq("i-1"), eq(false))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));
    let (handle, _task) = ProtectionCoordinator::new(Box::new(autoscaling), "group", "i-1").spawn();

    // a failing job is still bracketed
    let config = TestConfigBuilder::new().queue(queue_delivering(job_body(json!({ "source_bucket": "" })), 0)).build();
    let consumer = JobConsumer::new(config, Some(handle));

    match consumer.poll_once().await {
        PollOutcome::Processed { outcomes, protect: Some(protect), unprotect: Some(unprotect) } => {
            assert!(!outcomes[0].acknowledged());
            assert_matches!(protect.wait().await, Ok(true));
            assert_matches!(unprotect.wait().await, Ok(true));
        }
        other => panic!("expected a bracketed batch, got {:?}", other),
    }
}

#[rstest]
#[tokio::test]
async fn test_failed_protection_does_not_block_the_job() {
    let mut autoscaling = MockAutoScalingClient::new();
    autoscaling
        .expect_set_instance_protection()
        .with(eq("group"), eq("i-1"), eq(true))
        .times(6)
        .returning(|_, _, _| Err(AutoScalingError::InstanceNotFound("i-1".to_string())));
    let (handle, _task) = ProtectionCoordinator::new(Box::new(autoscaling), "group", "i-1")
        .with_retry_policy(RetryPolicy::new(5, Duration::ZERO))
        .spawn();

    let mut converter = MockReportConverter::new();
    converter.expect_check_manifest_exists().times(1).returning(|_| Ok(()));
    converter.expect_convert().times(1).returning(|_| Ok(()));
    converter.expect_columns().times(1).returning(|_| Ok(report_schema()));
    let (queries, catalog) = permissive_catalog();
    let config = TestConfigBuilder::new()
        .queue(queue_delivering(job_body(json!({})), 1))
        .converter(converter)
        .queries(queries)
        .catalog(catalog)
        .build();
    let consumer = JobConsumer::new(config, Some(handle));

    match consumer.poll_once().await {
        PollOutcome::Processed { outcomes, protect: Some(protect), unprotect: Some(unprotect) } => {
            assert!(outcomes[0].acknowledged());
            assert_matches!(
                protect.wait().await,
                Err(ProtectionError::AutoScaling(AutoScalingError::InstanceNotFound(_)))
            );
            // the flag never changed, so there is nothing to undo
            assert_matches!(unprotect.wait().await, Ok(false));
        }
        other => panic!("expected a bracketed batch, got {:?}", other),
    }
}
