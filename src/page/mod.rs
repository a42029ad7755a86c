//! Page layer: fixed-size byte buffers and the two table page formats.
//!
//! Every page in a store has the same size. A [`Page`] is just the buffer;
//! the page formats wrap it and re-derive their layout from the bytes after
//! each mutation:
//! - [`MetadataPage`]: length-prefixed schema blob followed by a pointer to
//!   the table's first data page
//! - [`DataPage`]: count-prefixed dense array of fixed-width rows

mod data;
mod layout;
mod metadata;

pub use data::DataPage;
pub use layout::{DataLayout, MetadataLayout};
pub use metadata::{MetadataPage, TableState};

use crate::error::{Result, StorageError};
use crate::types::{read_be_u32, PageIndex};
use std::fmt;

/// A fixed-size page buffer
#[derive(Clone, PartialEq, Eq)]
pub struct Page {
    index: PageIndex,
    data: Box<[u8]>,
}

impl Page {
    /// Create an all-zero page
    pub fn empty(index: PageIndex, size: usize) -> Self {
        Self {
            index,
            data: vec![0u8; size].into_boxed_slice(),
        }
    }

    /// Wrap bytes read from storage; `bytes` must be exactly `size` long
    pub fn from_bytes(index: PageIndex, size: usize, bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() != size {
            return Err(StorageError::invalid_page(format!(
                "page {} has {} bytes, expected {}",
                index,
                bytes.len(),
                size
            )));
        }
        Ok(Self {
            index,
            data: bytes.into_boxed_slice(),
        })
    }

    pub fn index(&self) -> PageIndex {
        self.index
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// True iff every byte is zero
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Copy `data` into the buffer at `offset`.
    ///
    /// Fails with `OutOfBounds` without touching the buffer if the range
    /// does not fit.
    pub fn overwrite(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let end = self.check_range(offset, data.len())?;
        self.data[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Zero the whole buffer
    pub fn free(&mut self) {
        self.data.fill(0);
    }

    /// Borrow `len` bytes starting at `offset`
    pub fn read(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = self.check_range(offset, len)?;
        Ok(&self.data[offset..end])
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        self.check_range(offset, 4)?;
        Ok(read_be_u32(&self.data, offset))
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        self.overwrite(offset, &value.to_be_bytes())
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<usize> {
        offset
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(StorageError::OutOfBounds {
                offset,
                len,
                size: self.data.len(),
            })
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("index", &self.index)
            .field("size", &self.size())
            .field("empty", &self.is_empty())
            .finish()
    }
}

impl AsRef<[u8]> for Page {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
