pub mod athena;
pub mod error;
pub mod glue;

use async_trait::async_trait;
pub use error::CatalogError;

use crate::types::schema::TableSchema;

/// Execution state reported for a submitted query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Unknown(String),
}

impl QueryState {
    /// Queued and running queries are still in flight
    pub fn is_transitional(&self) -> bool {
        matches!(self, QueryState::Queued | QueryState::Running)
    }

    pub fn as_str(&self) -> &str {
        match self {
            QueryState::Queued => "QUEUED",
            QueryState::Running => "RUNNING",
            QueryState::Succeeded => "SUCCEEDED",
            QueryState::Failed => "FAILED",
            QueryState::Cancelled => "CANCELLED",
            QueryState::Unknown(state) => state,
        }
    }
}

impl From<&str> for QueryState {
    fn from(state: &str) -> Self {
        match state {
            "QUEUED" => QueryState::Queued,
            "RUNNING" => QueryState::Running,
            "SUCCEEDED" => QueryState::Succeeded,
            "FAILED" => QueryState::Failed,
            "CANCELLED" => QueryState::Cancelled,
            other => QueryState::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for QueryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a query execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStatus {
    pub state: QueryState,
    pub reason: Option<String>,
}

/// Remote SQL execution: submit a statement, then poll it by id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Submit `sql` against `database`, writing results under `output_location`.
    /// Returns the execution id.
    async fn start_query(&self, database: &str, sql: &str, output_location: &str) -> Result<String, CatalogError>;

    async fn query_status(&self, execution_id: &str) -> Result<QueryStatus, CatalogError>;
}

/// Table definitions held by the catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Succeeds when the table exists, [`CatalogError::TableNotFound`] when it does not
    async fn get_table(&self, database: &str, table: &str) -> Result<(), CatalogError>;

    /// Replace the column list of an existing table, leaving the rest of its definition untouched
    async fn update_columns(&self, database: &str, table: &str, schema: &TableSchema) -> Result<(), CatalogError>;
}
