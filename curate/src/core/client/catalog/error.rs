use aws_sdk_athena::operation::get_query_execution::GetQueryExecutionError;
use aws_sdk_athena::operation::start_query_execution::StartQueryExecutionError;
use aws_sdk_glue::operation::get_table::GetTableError;
use aws_sdk_glue::operation::update_table::UpdateTableError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Error querying Athena, StartQueryExecution: {0}")]
    StartQueryError(#[from] aws_sdk_athena::error::SdkError<StartQueryExecutionError>),

    #[error("Error querying Athena, GetQueryExecution: {0}")]
    GetQueryExecutionError(#[from] aws_sdk_athena::error::SdkError<GetQueryExecutionError>),

    #[error("Athena did not return a query execution id")]
    MissingExecutionId,

    #[error("Query {execution_id} completion state is NOT SUCCEEDED, state is: {state}")]
    QueryNotSucceeded { execution_id: String, state: String, reason: Option<String> },

    #[error("Table {database}.{table} does not exist")]
    TableNotFound { database: String, table: String },

    #[error("Failed to check existing table: {0}")]
    GetTableError(#[from] aws_sdk_glue::error::SdkError<GetTableError>),

    #[error("Error updating table column info: {0}")]
    UpdateTableError(#[from] aws_sdk_glue::error::SdkError<UpdateTableError>),

    #[error("Invalid table definition: {0}")]
    InvalidTableDefinition(String),

    #[error("Could not create database {database}: {source}")]
    CreateDatabase {
        database: String,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("Could not create table {table}: {source}")]
    CreateTable {
        table: String,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("Refusing to publish table {0} without columns")]
    EmptySchema(String),
}
