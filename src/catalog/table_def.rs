//! Table definition and its DDL blob encoding.

use crate::error::{Result, StorageError};
use crate::row::{FieldKind, RowSchema};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One column of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: FieldKind,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Table definition stored verbatim in a metadata page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Parse `name:kind` column specs, e.g. `["id:int4", "name:text16"]`
    pub fn from_specs(name: impl Into<String>, specs: &[&str]) -> Result<Self> {
        let columns = specs
            .iter()
            .map(|spec| -> Result<ColumnDef> {
                let (col, kind) = spec.split_once(':').ok_or_else(|| {
                    StorageError::invalid_schema(format!("expected name:kind, got {}", spec))
                })?;
                Ok(ColumnDef::new(col.trim(), kind.parse()?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(name, columns))
    }

    /// Check names and derive the row schema
    pub fn row_schema(&self) -> Result<RowSchema> {
        if self.name.trim().is_empty() {
            return Err(StorageError::invalid_schema("table name is empty"));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.name.trim().is_empty() {
                return Err(StorageError::invalid_schema("column name is empty"));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(StorageError::invalid_schema(format!(
                    "duplicate column: {}",
                    column.name
                )));
            }
        }

        RowSchema::new(self.columns.iter().map(|c| c.kind).collect())
    }

    /// Encode as the DDL blob stored in a metadata page
    pub fn to_ddl(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a DDL blob read from a metadata page
    pub fn from_ddl(blob: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(blob)?)
    }
}
