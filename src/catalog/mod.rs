//! Table definitions and table handles.
//!
//! A table is one metadata page plus the data page its pointer names. The
//! metadata page stores the table definition as an opaque DDL blob; this
//! module owns the blob's format (JSON) and the read-modify-write cycle
//! against a [`PageStore`](crate::storage::PageStore).

mod table;
mod table_def;

pub use table::Table;
pub use table_def::{ColumnDef, TableDef};
