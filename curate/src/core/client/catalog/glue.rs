use crate::core::client::catalog::{CatalogClient, CatalogError};
use crate::types::schema::TableSchema;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_glue::types::{Column, StorageDescriptor, Table, TableInput};
use aws_sdk_glue::Client;

#[derive(Clone, Debug)]
pub struct Glue {
    client: Client,
}

impl Glue {
    pub fn new(aws_config: &SdkConfig) -> Self {
        Self { client: Client::new(aws_config) }
    }

    async fn fetch_table(&self, database: &str, table: &str) -> Result<Table, CatalogError> {
        let output = match self.client.get_table().database_name(database).name(table).send().await {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_entity_not_found_exception()) => {
                return Err(CatalogError::TableNotFound { database: database.to_string(), table: table.to_string() });
            }
            Err(err) => return Err(err.into()),
        };

        output
            .table
            .ok_or_else(|| CatalogError::TableNotFound { database: database.to_string(), table: table.to_string() })
    }

    fn columns(schema: &TableSchema) -> Result<Vec<Column>, CatalogError> {
        schema
            .iter()
            .map(|column| {
                Column::builder()
                    .name(&column.name)
                    .r#type(&column.data_type)
                    .build()
                    .map_err(|e| CatalogError::InvalidTableDefinition(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl CatalogClient for Glue {
    async fn get_table(&self, database: &str, table: &str) -> Result<(), CatalogError> {
        self.fetch_table(database, table).await.map(|_| ())
    }

    async fn update_columns(&self, database: &str, table: &str, schema: &TableSchema) -> Result<(), CatalogError> {
        let existing = self.fetch_table(database, table).await?;

        let mut storage_descriptor =
            existing.storage_descriptor.clone().unwrap_or_else(|| StorageDescriptor::builder().build());
        storage_descriptor.columns = Some(Self::columns(schema)?);

        let table_input = TableInput::builder()
            .name(table)
            .set_table_type(existing.table_type.clone())
            .set_parameters(existing.parameters.clone())
            .set_partition_keys(existing.partition_keys.clone())
            .storage_descriptor(storage_descriptor)
            .build()
            .map_err(|e| CatalogError::InvalidTableDefinition(e.to_string()))?;

        self.client.update_table().database_name(database).table_input(table_input).send().await?;
        Ok(())
    }
}
