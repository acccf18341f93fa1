use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{JobError, ValidationError};

/// Catalog database used when a job does not name one
pub const DEFAULT_CATALOG_DATABASE: &str = "cur";

/// A report conversion job, deserialized from one queue message body.
///
/// Every field is string typed on the wire. Unknown fields are ignored, and `null`, empty and
/// missing values are all treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Job {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cur_report_descriptor: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source_bucket: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub destination_bucket: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub report_path: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub report_name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub source_role_arn: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub source_external_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub destination_role_arn: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub destination_external_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub destination_kms_key_arn: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cur_database: Option<String>,
    /// `YYYYMMDD` override of the billing period anchor
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

impl Job {
    /// Decode a message body, filling in the default catalog database.
    pub fn from_message_body(body: &str) -> Result<Self, JobError> {
        let mut job: Job = serde_json::from_str(body)?;
        if job.cur_database.is_none() {
            job.cur_database = Some(DEFAULT_CATALOG_DATABASE.to_string());
        }
        Ok(job)
    }

    /// Checks the fields every remote call depends on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source_bucket.is_empty() {
            return Err(ValidationError::MissingField("source bucket"));
        }
        if self.cur_report_descriptor.is_empty() {
            return Err(ValidationError::MissingField("report descriptor"));
        }
        Ok(())
    }

    pub fn report_id(&self) -> &str {
        &self.cur_report_descriptor
    }

    pub fn database(&self) -> &str {
        self.cur_database.as_deref().unwrap_or(DEFAULT_CATALOG_DATABASE)
    }
}
