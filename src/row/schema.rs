//! Row schema: tagged fixed-width field descriptors.

use crate::error::{Result, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Widest supported integer field, in bytes
pub const MAX_INT_WIDTH: usize = 8;

/// Kind and width of one field in a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// Signed two's-complement integer of `width` bytes
    Int { width: usize },
    /// Text padded with zero bytes (or truncated) to `width` bytes
    Text { width: usize },
}

impl FieldKind {
    pub fn width(self) -> usize {
        match self {
            Self::Int { width } | Self::Text { width } => width,
        }
    }

    fn validate(self) -> Result<()> {
        match self {
            Self::Int { width } if width == 0 || width > MAX_INT_WIDTH => Err(
                StorageError::invalid_schema(format!(
                    "integer width must be 1..={}, got {}",
                    MAX_INT_WIDTH, width
                )),
            ),
            Self::Text { width: 0 } => Err(StorageError::invalid_schema(
                "text width must be at least 1",
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int { width } => write!(f, "int{}", width),
            Self::Text { width } => write!(f, "text{}", width),
        }
    }
}

impl FromStr for FieldKind {
    type Err = StorageError;

    /// Parse `int<N>` or `text<N>`, e.g. `int4`, `text16`
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let (kind, digits) = if let Some(rest) = lower.strip_prefix("int") {
            ("int", rest)
        } else if let Some(rest) = lower.strip_prefix("text") {
            ("text", rest)
        } else {
            return Err(StorageError::invalid_schema(format!(
                "unknown field kind: {}",
                s
            )));
        };

        let width: usize = digits.parse().map_err(|_| {
            StorageError::invalid_schema(format!("missing or invalid width in: {}", s))
        })?;

        let field = if kind == "int" {
            Self::Int { width }
        } else {
            Self::Text { width }
        };
        field.validate()?;
        Ok(field)
    }
}

/// Ordered, fixed-width row layout shared by every row of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    fields: Vec<FieldKind>,
    row_size: usize,
}

impl RowSchema {
    /// Build a schema, rejecting empty field lists and invalid widths
    pub fn new(fields: Vec<FieldKind>) -> Result<Self> {
        if fields.is_empty() {
            return Err(StorageError::invalid_schema("schema has no fields"));
        }
        for field in &fields {
            field.validate()?;
        }
        let row_size = fields
            .iter()
            .try_fold(0usize, |acc, f| acc.checked_add(f.width()))
            .ok_or_else(|| StorageError::invalid_schema("row size overflows"))?;
        Ok(Self { fields, row_size })
    }

    pub fn fields(&self) -> &[FieldKind] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false; a schema has at least one field
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Bytes occupied by one encoded row
    pub fn row_size(&self) -> usize {
        self.row_size
    }
}
