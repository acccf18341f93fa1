use crate::core::client::catalog::{CatalogError, QueryClient, QueryState, QueryStatus};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_athena::types::{QueryExecutionContext, ResultConfiguration};
use aws_sdk_athena::Client;

#[derive(Clone, Debug)]
pub struct Athena {
    client: Client,
}

impl Athena {
    pub fn new(aws_config: &SdkConfig) -> Self {
        Self { client: Client::new(aws_config) }
    }
}

#[async_trait]
impl QueryClient for Athena {
    async fn start_query(&self, database: &str, sql: &str, output_location: &str) -> Result<String, CatalogError> {
        let output = self
            .client
            .start_query_execution()
            .query_string(sql)
            .query_execution_context(QueryExecutionContext::builder().database(database).build())
            .result_configuration(ResultConfiguration::builder().output_location(output_location).build())
            .send()
            .await?;

        output.query_execution_id().map(str::to_string).ok_or(CatalogError::MissingExecutionId)
    }

    async fn query_status(&self, execution_id: &str) -> Result<QueryStatus, CatalogError> {
        let output = self.client.get_query_execution().query_execution_id(execution_id).send().await?;

        let status = output.query_execution().and_then(|execution| execution.status());
        let state = status
            .and_then(|status| status.state())
            .map(|state| QueryState::from(state.as_str()))
            .unwrap_or_else(|| QueryState::Unknown("UNKNOWN".to_string()));
        let reason = status.and_then(|status| status.state_change_reason()).map(str::to_string);

        Ok(QueryStatus { state, reason })
    }
}
