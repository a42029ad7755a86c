//! Fixed-width rows.
//!
//! A [`RowSchema`] is an ordered list of fixed-width fields. Every row encoded
//! against a schema occupies exactly [`RowSchema::row_size`] bytes, which is
//! what lets a data page compute its capacity by arithmetic alone.

mod codec;
mod schema;
mod value;

pub use codec::{decode_row, encode_row, row_size};
pub use schema::{FieldKind, RowSchema, MAX_INT_WIDTH};
pub use value::{Row, Value};
