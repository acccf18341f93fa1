use std::time::Duration;

use aws_config::{Region, SdkConfig};
use aws_sdk_sts::error::SdkError;
use aws_sdk_sts::operation::get_caller_identity::GetCallerIdentityError;
use serde::Deserialize;
use thiserror::Error;

/// EC2 instance identity document
pub const INSTANCE_IDENTITY_URL: &str = "http://169.254.169.254/latest/dynamic/instance-identity/document";
/// Metadata is only reachable on EC2, so the lookup gives up quickly elsewhere
pub const METADATA_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Failed to get caller identity: {0}")]
    CallerIdentityError(#[from] SdkError<GetCallerIdentityError>),

    #[error("Caller identity has no account")]
    MissingAccount,

    #[error("No region in instance metadata or AWS configuration")]
    MissingRegion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDocument {
    pub account_id: Option<String>,
    pub region: Option<String>,
    pub instance_id: Option<String>,
    pub availability_zone: Option<String>,
}

/// Where the worker runs. Discovered once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceIdentity {
    pub account_id: String,
    pub region: String,
    /// Only known when running on EC2
    pub instance_id: Option<String>,
    pub availability_zone: Option<String>,
}

impl InstanceIdentity {
    /// An identity document is usable when it names both account and region
    pub fn from_document(document: IdentityDocument) -> Option<Self> {
        Some(Self {
            account_id: document.account_id.filter(|a| !a.is_empty())?,
            region: document.region.filter(|r| !r.is_empty())?,
            instance_id: document.instance_id.filter(|i| !i.is_empty()),
            availability_zone: document.availability_zone.filter(|z| !z.is_empty()),
        })
    }

    /// Discover the identity from instance metadata, falling back to STS when off EC2.
    pub async fn discover(aws_config: &SdkConfig, metadata_url: &str) -> Result<Self, IdentityError> {
        if let Some(identity) = fetch_identity_document(metadata_url).await.and_then(Self::from_document) {
            tracing::debug!(
                account_id = %identity.account_id,
                region = %identity.region,
                instance_id = ?identity.instance_id,
                "Identity resolved from instance metadata"
            );
            return Ok(identity);
        }

        let region = aws_config.region().map(|r| r.to_string()).ok_or(IdentityError::MissingRegion)?;
        let output = aws_sdk_sts::Client::new(aws_config).get_caller_identity().send().await?;
        let account_id = output.account().map(str::to_string).ok_or(IdentityError::MissingAccount)?;

        tracing::debug!(account_id = %account_id, region = %region, "Identity resolved from STS");
        Ok(Self { account_id, region, instance_id: None, availability_zone: None })
    }

    /// The SDK configuration pinned to the discovered region
    pub fn regional_config(&self, aws_config: &SdkConfig) -> SdkConfig {
        aws_config.clone().into_builder().region(Region::new(self.region.clone())).build()
    }

    /// Default Athena result location for this account and region
    pub fn query_results_location(&self) -> String {
        format!("s3://aws-athena-query-results-{}-{}/feedprocessor/", self.account_id, self.region)
    }
}

/// Best effort fetch of the identity document, `None` on any failure.
pub async fn fetch_identity_document(url: &str) -> Option<IdentityDocument> {
    let client = match reqwest::Client::builder().timeout(METADATA_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Could not build metadata client");
            return None;
        }
    };

    let response = match client.get(url).send().await.and_then(|r| r.error_for_status()) {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(error = %e, "Instance metadata not available");
            return None;
        }
    };

    match response.json::<IdentityDocument>().await {
        Ok(document) => Some(document),
        Err(e) => {
            tracing::warn!(error = %e, "Could not parse instance metadata");
            None
        }
    }
}
