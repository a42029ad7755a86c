//! Store file header.
//!
//! The first page (page 0) of the store file describes the store itself.

use crate::error::{Result, StorageError};
use crate::types::{read_be_u32, validate_page_size};

/// Magic bytes to identify a valid store file
pub const MAGIC: &[u8; 16] = b"BlockStorageV01\0";

/// Bytes of page 0 used by the header
pub const FILE_HEADER_SIZE: usize = 28;

/// Store file header
///
/// Layout:
/// ```text
/// Offset  Size  Description
/// 0       16    Magic string "BlockStorageV01\0"
/// 16      4     Page size
/// 20      4     Total page count
/// 24      4     Checksum of bytes 0..24 (CRC32)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Page size in bytes
    pub page_size: u32,
    /// Total number of pages in the file (including header page)
    pub page_count: u32,
}

impl FileHeader {
    /// Create a header for an empty store
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size as u32,
            page_count: 1,
        }
    }

    /// Read a header from the start of page 0
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FILE_HEADER_SIZE {
            return Err(StorageError::invalid_db("header too short"));
        }

        if &bytes[0..16] != MAGIC {
            return Err(StorageError::invalid_db("invalid magic bytes"));
        }

        let stored_checksum = read_be_u32(bytes, 24);
        if stored_checksum != crc32fast::hash(&bytes[0..24]) {
            return Err(StorageError::corruption("header checksum mismatch"));
        }

        let page_size = read_be_u32(bytes, 16);
        validate_page_size(page_size as usize).map_err(|_| {
            StorageError::invalid_db(format!("unsupported page size: {}", page_size))
        })?;

        let page_count = read_be_u32(bytes, 20);
        if page_count == 0 {
            return Err(StorageError::invalid_db("page count is zero"));
        }

        Ok(Self {
            page_size,
            page_count,
        })
    }

    /// Write this header into the start of page 0
    pub fn write(&self, bytes: &mut [u8]) {
        bytes[..FILE_HEADER_SIZE].fill(0);
        bytes[0..16].copy_from_slice(MAGIC);
        bytes[16..20].copy_from_slice(&self.page_size.to_be_bytes());
        bytes[20..24].copy_from_slice(&self.page_count.to_be_bytes());

        let checksum = crc32fast::hash(&bytes[0..24]);
        bytes[24..28].copy_from_slice(&checksum.to_be_bytes());
    }

    /// Claim the next page index at the end of the file
    pub fn extend(&mut self) -> u32 {
        let index = self.page_count;
        self.page_count += 1;
        index
    }
}
