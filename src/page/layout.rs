//! Derived page layouts.
//!
//! Neither page format stores offsets. Each layout is recomputed from the
//! prefix at offset 0 plus a few constants.

use crate::error::{Result, StorageError};
use crate::page::Page;
use crate::types::{COUNT_FIELD_SIZE, LEN_FIELD_SIZE, POINTER_FIELD_SIZE};

/// Metadata page layout
///
/// ```text
/// Offset              Size       Description
/// 0                   4          ddl_size
/// 4                   ddl_size   Schema blob
/// 4 + ddl_size        4          Data pointer (index of first data page)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataLayout {
    /// Length of the schema blob
    pub ddl_size: u32,
}

impl MetadataLayout {
    /// Read the layout from a page buffer
    pub fn read(page: &Page) -> Result<Self> {
        Ok(Self {
            ddl_size: page.read_u32(0)?,
        })
    }

    pub fn ddl_start(&self) -> usize {
        LEN_FIELD_SIZE
    }

    pub fn pointer_start(&self) -> usize {
        self.ddl_start() + self.ddl_size as usize
    }

    /// One past the last byte used
    pub fn end(&self) -> usize {
        self.pointer_start() + POINTER_FIELD_SIZE
    }

    /// Bytes needed to store a blob of `blob_len` bytes
    pub fn required_size(blob_len: usize) -> usize {
        LEN_FIELD_SIZE + blob_len + POINTER_FIELD_SIZE
    }

    /// Largest blob a page of `page_size` bytes can hold
    pub fn max_blob_size(page_size: usize) -> usize {
        page_size.saturating_sub(LEN_FIELD_SIZE + POINTER_FIELD_SIZE)
    }
}

/// Data page layout
///
/// ```text
/// Offset                       Size                   Description
/// 0                            4                      row_count
/// 4                            row_count * row_size   Packed rows, slot 0 first
/// 4 + row_count * row_size     ..                     Unused (zero)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLayout {
    /// Number of rows stored
    pub row_count: u32,
    /// Size of one encoded row
    pub row_size: usize,
    /// Size of the page
    pub page_size: usize,
}

impl DataLayout {
    /// Read the layout from a page buffer, checking that the rows fit
    pub fn read(page: &Page, row_size: usize) -> Result<Self> {
        let layout = Self {
            row_count: page.read_u32(0)?,
            row_size,
            page_size: page.size(),
        };
        if layout.rows_end_checked().is_none() {
            return Err(StorageError::corruption(format!(
                "page {}: {} rows of {} bytes do not fit in {} bytes",
                page.index(),
                layout.row_count,
                row_size,
                layout.page_size
            )));
        }
        Ok(layout)
    }

    pub fn rows_start(&self) -> usize {
        COUNT_FIELD_SIZE
    }

    pub fn rows_end(&self) -> usize {
        self.rows_start() + self.row_count as usize * self.row_size
    }

    fn rows_end_checked(&self) -> Option<usize> {
        (self.row_count as usize)
            .checked_mul(self.row_size)
            .and_then(|n| n.checked_add(self.rows_start()))
            .filter(|&end| end <= self.page_size)
    }

    /// Offset of row `slot`
    pub fn slot_offset(&self, slot: u32) -> usize {
        self.rows_start() + slot as usize * self.row_size
    }

    /// Additional rows that still fit
    pub fn capacity_remaining(&self) -> usize {
        (self.page_size - self.rows_end()) / self.row_size
    }
}
