use serde::{Deserialize, Serialize};

/// One column of a converted report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: String,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self { name: name.into(), data_type: data_type.into() }
    }
}

/// Ordered column list produced by a successful conversion
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSchema(Vec<ColumnDefinition>);

impl TableSchema {
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        Self(columns)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDefinition> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column list in DDL form: `` `name` type `` joined by `,\n`
    pub fn to_ddl_columns(&self) -> String {
        self.0.iter().map(|c| format!("`{}` {}", c.name, c.data_type)).collect::<Vec<_>>().join(",\n")
    }
}

impl FromIterator<ColumnDefinition> for TableSchema {
    fn from_iter<I: IntoIterator<Item = ColumnDefinition>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TableSchema {
    type Item = &'a ColumnDefinition;
    type IntoIter = std::slice::Iter<'a, ColumnDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
