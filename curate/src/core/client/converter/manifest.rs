//! Report manifest as published next to the billing data.

use std::collections::HashSet;

use serde::Deserialize;

use crate::types::schema::{ColumnDefinition, TableSchema};

#[derive(Debug, Clone, Deserialize)]
pub struct ReportManifest {
    #[serde(default)]
    pub columns: Vec<ManifestColumn>,
    #[serde(default, rename = "reportKeys")]
    pub report_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestColumn {
    #[serde(default)]
    pub category: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub column_type: Option<String>,
}

impl ReportManifest {
    pub fn parse(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// Catalog column list of the converted report. Names are `{category}_{name}` made SQL safe;
    /// later duplicates are dropped.
    pub fn table_schema(&self) -> TableSchema {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .map(|column| ColumnDefinition::new(column.sql_name(), column.sql_type()))
            .filter(|column| seen.insert(column.name.clone()))
            .collect()
    }
}

impl ManifestColumn {
    pub fn sql_name(&self) -> String {
        let raw = if self.category.is_empty() { self.name.clone() } else { format!("{}_{}", self.category, self.name) };
        raw.chars().map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' }).collect()
    }

    pub fn sql_type(&self) -> &'static str {
        match self.column_type.as_deref() {
            Some("BigDecimal") | Some("OptionalBigDecimal") => "double",
            _ => "string",
        }
    }
}
