//! Common types and layout constants used throughout the storage layer.

mod page_index;

pub use page_index::PageIndex;

/// Default page size in bytes (4KB)
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Smallest page size a store accepts (must hold the file header)
pub const MIN_PAGE_SIZE: usize = 32;

/// Largest page size a store accepts
pub const MAX_PAGE_SIZE: usize = 65536;

/// Width of the schema length prefix at the start of a metadata page
pub const LEN_FIELD_SIZE: usize = 4;

/// Width of a page pointer
pub const POINTER_FIELD_SIZE: usize = 4;

/// Width of the row count prefix at the start of a data page
pub const COUNT_FIELD_SIZE: usize = 4;

/// Check that a page size is within the supported range
pub fn validate_page_size(page_size: usize) -> crate::Result<()> {
    if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(crate::StorageError::invalid_page(format!(
            "page size {} outside supported range {}..={}",
            page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
        )));
    }
    Ok(())
}

/// Read a big-endian u32 at `offset`; caller guarantees the range is in bounds
pub(crate) fn read_be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
