//! Publishes converted reports to the SQL catalog.

use std::time::Duration;

use tokio::time::sleep;

use crate::core::client::catalog::{CatalogClient, CatalogError, QueryClient, QueryState};
use crate::types::schema::TableSchema;

/// Database the `CREATE DATABASE` statement runs against
const BOOTSTRAP_DATABASE: &str = "default";

/// The table a converted report is published as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTable {
    pub database: String,
    pub name: String,
    /// Storage location of the converted data, `s3://bucket/path/`
    pub location: String,
    /// Whether the data was written with a customer managed key
    pub encrypted: bool,
}

impl CatalogTable {
    pub fn create_database_sql(&self) -> String {
        format!("CREATE DATABASE IF NOT EXISTS `{}`", self.database)
    }

    pub fn create_table_sql(&self, schema: &TableSchema) -> String {
        let mut sql = format!(
            "CREATE EXTERNAL TABLE IF NOT EXISTS `{}` ({}) STORED AS PARQUET LOCATION '{}'",
            self.name,
            schema.to_ddl_columns(),
            self.location
        );
        if self.encrypted {
            sql.push_str(" TBLPROPERTIES ('has_encrypted_data'='true')");
        }
        sql
    }
}

pub struct CatalogSynchronizer<'a> {
    queries: &'a dyn QueryClient,
    catalog: &'a dyn CatalogClient,
    output_location: String,
    poll_interval: Duration,
}

impl<'a> CatalogSynchronizer<'a> {
    pub fn new(
        queries: &'a dyn QueryClient,
        catalog: &'a dyn CatalogClient,
        output_location: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self { queries, catalog, output_location: output_location.into(), poll_interval }
    }

    /// Submits `sql` and waits for it to finish, polling at a fixed interval.
    pub async fn execute_query(&self, database: &str, sql: &str) -> Result<(), CatalogError> {
        let execution_id = self.queries.start_query(database, sql, &self.output_location).await?;
        tracing::debug!(execution_id = %execution_id, database = %database, "Query submitted");

        loop {
            let status = self.queries.query_status(&execution_id).await?;
            if status.state.is_transitional() {
                sleep(self.poll_interval).await;
                continue;
            }

            if status.state == QueryState::Succeeded {
                tracing::debug!(execution_id = %execution_id, "Query succeeded");
                return Ok(());
            }
            return Err(CatalogError::QueryNotSucceeded {
                execution_id,
                state: status.state.to_string(),
                reason: status.reason,
            });
        }
    }

    /// Makes sure `table` exists and carries exactly the columns in `schema`.
    pub async fn synchronize(&self, table: &CatalogTable, schema: &TableSchema) -> Result<(), CatalogError> {
        if schema.is_empty() {
            return Err(CatalogError::EmptySchema(table.name.clone()));
        }

        self.execute_query(BOOTSTRAP_DATABASE, &table.create_database_sql()).await.map_err(|e| {
            CatalogError::CreateDatabase { database: table.database.clone(), source: Box::new(e) }
        })?;

        match self.catalog.get_table(&table.database, &table.name).await {
            Ok(()) => tracing::debug!(table = %table.name, "Table exists, updating columns"),
            Err(CatalogError::TableNotFound { .. }) => {
                tracing::info!(database = %table.database, table = %table.name, "Creating table");
                self.execute_query(&table.database, &table.create_table_sql(schema))
                    .await
                    .map_err(|e| CatalogError::CreateTable { table: table.name.clone(), source: Box::new(e) })?;
            }
            Err(e) => return Err(e),
        }

        self.catalog.update_columns(&table.database, &table.name, schema).await?;
        tracing::info!(table = %table.name, columns = schema.len(), "Catalog table synchronized");
        Ok(())
    }
}
