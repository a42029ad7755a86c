//! Error types for the block storage layer.

use crate::types::PageIndex;
use thiserror::Error;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error from the underlying file system
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page was never allocated
    #[error("Page {0} not found")]
    PageNotFound(PageIndex),

    /// A byte-range access would run past the end of the page buffer
    #[error("Out of bounds: {len} bytes at offset {offset} exceed page size {size}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },

    /// Schema blob plus its length prefix and pointer do not fit in one page
    #[error("Schema too large: {size} bytes (max: {max})")]
    SchemaTooLarge { size: usize, max: usize },

    /// Schema requested from a metadata page that holds no table
    #[error("No metadata stored in page {0}")]
    NoMetadata(PageIndex),

    /// Data pointer requested from a metadata page that holds no table
    #[error("Metadata page {0} is not populated")]
    NotPopulated(PageIndex),

    /// Append attempted on a data page with no remaining capacity
    #[error("Page {page} is full ({row_count} rows of {row_size} bytes)")]
    PageFull {
        page: PageIndex,
        row_count: u32,
        row_size: usize,
    },

    /// In-place update targets a slot that does not exist
    #[error("Row id {row_id} out of range (row count: {row_count})")]
    RowIdOutOfRange { row_id: u32, row_count: u32 },

    /// Last row requested from a data page without rows
    #[error("Page {0} holds no rows")]
    EmptyPage(PageIndex),

    /// Integer does not fit the declared field width
    #[error("Value {value} out of range for {width}-byte integer field {field}")]
    ValueOutOfRange { field: usize, value: i64, width: usize },

    /// Value variant does not match the field kind
    #[error("Type mismatch in field {field}: expected {expected}, found {found}")]
    TypeMismatch {
        field: usize,
        expected: String,
        found: String,
    },

    /// Row has a different number of values than the schema has fields
    #[error("Row has {found} values but schema has {expected} fields")]
    ArityMismatch { expected: usize, found: usize },

    /// Row schema or field declaration is invalid
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Invalid page size or page construction
    #[error("Invalid page: {0}")]
    InvalidPage(String),

    /// Stored bytes violate a layout invariant
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// Database file is corrupted or has invalid format
    #[error("Invalid database file: {0}")]
    InvalidDatabaseFile(String),

    /// Invalid operation for the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Table definition could not be encoded or decoded
    #[error("DDL error: {0}")]
    Ddl(#[from] serde_json::Error),
}

impl StorageError {
    /// Create a corruption error with a message
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Create an invalid page error
    pub fn invalid_page(msg: impl Into<String>) -> Self {
        Self::InvalidPage(msg.into())
    }

    /// Create an invalid schema error
    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::InvalidSchema(msg.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Create an invalid database file error
    pub fn invalid_db(msg: impl Into<String>) -> Self {
        Self::InvalidDatabaseFile(msg.into())
    }
}
