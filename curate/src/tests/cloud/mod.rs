use aws_config::SdkConfig;
use httpmock::prelude::*;
use rstest::rstest;
use serde_json::json;

use crate::core::cloud::{fetch_identity_document, IdentityDocument, InstanceIdentity};

const DOCUMENT_PATH: &str = "/latest/dynamic/instance-identity/document";

#[rstest]
#[tokio::test]
async fn test_identity_from_instance_metadata() {
    let server = MockServer::start_async().await;
    let document = server
        .mock_async(|when, then| {
            when.method(GET).path(DOCUMENT_PATH);
            then.status(200).json_body(json!({
                "accountId": "111111111111",
                "region": "eu-west-1",
                "instanceId": "i-0123456789abcdef0",
                "availabilityZone": "eu-west-1b",
                "architecture": "x86_64"
            }));
        })
        .await;

    // metadata is complete, so STS is never consulted
    let identity = InstanceIdentity::discover(&SdkConfig::builder().build(), &server.url(DOCUMENT_PATH)).await.unwrap();

    document.assert_async().await;
    assert_eq!(
        identity,
        InstanceIdentity {
            account_id: "111111111111".to_string(),
            region: "eu-west-1".to_string(),
            instance_id: Some("i-0123456789abcdef0".to_string()),
            availability_zone: Some("eu-west-1b".to_string()),
        }
    );
    assert_eq!(
        identity.query_results_location(),
        "s3://aws-athena-query-results-111111111111-eu-west-1/feedprocessor/"
    );
}

#[rstest]
#[tokio::test]
async fn test_metadata_error_status_yields_nothing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(DOCUMENT_PATH);
            then.status(404);
        })
        .await;

    assert_eq!(fetch_identity_document(&server.url(DOCUMENT_PATH)).await, None);
}

#[rstest]
#[tokio::test]
async fn test_unreachable_metadata_yields_nothing() {
    assert_eq!(fetch_identity_document("http://127.0.0.1:1/document").await, None);
}

#[rstest]
#[case::no_region(IdentityDocument { account_id: Some("1".into()), ..Default::default() })]
#[case::empty_account(IdentityDocument { account_id: Some(String::new()), region: Some("us-east-1".into()), ..Default::default() })]
fn test_incomplete_document_is_unusable(#[case] document: IdentityDocument) {
    assert_eq!(InstanceIdentity::from_document(document), None);
}

#[rstest]
fn test_regional_config_pins_region() {
    let identity = InstanceIdentity {
        account_id: "1".to_string(),
        region: "ap-southeast-2".to_string(),
        instance_id: None,
        availability_zone: None,
    };

    let config = identity.regional_config(&SdkConfig::builder().build());

    assert_eq!(config.region().map(|r| r.as_ref()), Some("ap-southeast-2"));
}
