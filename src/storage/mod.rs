//! Page storage: maps page indices to fixed-size slots of a backing medium.
//!
//! The page formats never do I/O themselves. A [`PageStore`] hands out whole
//! [`Page`]s and takes them back; page `i` lives at byte offset
//! `i * page_size`. Index 0 is reserved for the store header.

mod file_header;
mod file_store;
mod freelist;
mod memory;

pub use file_header::{FileHeader, FILE_HEADER_SIZE};
pub use file_store::FilePageStore;
pub use freelist::FreeList;
pub use memory::MemoryPageStore;

use crate::error::Result;
use crate::page::Page;
use crate::types::PageIndex;

/// Trait for page storage backends
///
/// This abstraction allows swapping the file backend for an in-memory one
/// in tests.
pub trait PageStore: Send + Sync {
    /// Size of every page in this store
    fn page_size(&self) -> usize;

    /// Read a page
    fn read_page(&self, index: PageIndex) -> Result<Page>;

    /// Write a page back to its slot
    fn write_page(&self, page: &Page) -> Result<()>;

    /// Allocate a zeroed page, reusing freed pages first
    fn allocate_page(&self) -> Result<PageIndex>;

    /// Zero a page and make it available for reuse
    fn free_page(&self, index: PageIndex) -> Result<()>;

    /// Total number of pages, including the header page
    fn page_count(&self) -> u32;

    /// Number of freed pages awaiting reuse
    fn free_page_count(&self) -> usize;

    /// Flush everything to durable storage
    fn sync(&self) -> Result<()>;
}
