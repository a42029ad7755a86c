//! In-memory page store.

use crate::error::{Result, StorageError};
use crate::page::Page;
use crate::storage::{FreeList, PageStore};
use crate::types::{validate_page_size, PageIndex};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

/// Page store that keeps every page in memory.
///
/// Mirrors [`FilePageStore`](crate::storage::FilePageStore): index 0 is
/// reserved, freed pages are zeroed and reused.
pub struct MemoryPageStore {
    pages: RwLock<Vec<Box<[u8]>>>,
    free_list: Mutex<FreeList>,
    page_size: usize,
}

impl MemoryPageStore {
    pub fn new(page_size: usize) -> Result<Self> {
        validate_page_size(page_size)?;
        Ok(Self {
            // Slot 0 stands in for the header page
            pages: RwLock::new(vec![vec![0u8; page_size].into_boxed_slice()]),
            free_list: Mutex::new(FreeList::new()),
            page_size,
        })
    }

    fn check_index(&self, index: PageIndex, page_count: usize) -> Result<()> {
        if index == PageIndex::HEADER {
            return Err(StorageError::invalid_operation(
                "cannot access header page directly",
            ));
        }
        if index.value() as usize >= page_count {
            return Err(StorageError::PageNotFound(index));
        }
        Ok(())
    }
}

impl PageStore for MemoryPageStore {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn read_page(&self, index: PageIndex) -> Result<Page> {
        let pages = self.pages.read();
        self.check_index(index, pages.len())?;
        Page::from_bytes(index, self.page_size, pages[index.value() as usize].to_vec())
    }

    fn write_page(&self, page: &Page) -> Result<()> {
        let mut pages = self.pages.write();
        self.check_index(page.index(), pages.len())?;
        if page.size() != self.page_size {
            return Err(StorageError::invalid_page(format!(
                "page data must be {} bytes, got {}",
                self.page_size,
                page.size()
            )));
        }
        pages[page.index().value() as usize].copy_from_slice(page.as_bytes());
        Ok(())
    }

    fn allocate_page(&self) -> Result<PageIndex> {
        if let Some(index) = self.free_list.lock().pop() {
            return Ok(index);
        }

        let mut pages = self.pages.write();
        let index = u32::try_from(pages.len())
            .ok()
            .filter(|&i| i != u32::MAX)
            .ok_or_else(|| StorageError::invalid_operation("page index space exhausted"))?;
        pages.push(vec![0u8; self.page_size].into_boxed_slice());

        debug!(page = index, "allocated in-memory page");
        Ok(PageIndex::new(index))
    }

    fn free_page(&self, index: PageIndex) -> Result<()> {
        let mut pages = self.pages.write();
        self.check_index(index, pages.len())?;
        pages[index.value() as usize].fill(0);
        if self.free_list.lock().push(index) {
            debug!(page = %index, "freed in-memory page");
        }
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.pages.read().len() as u32
    }

    fn free_page_count(&self) -> usize {
        self.free_list.lock().len()
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_allocate_write_read_free() -> Result<()> {
        let store = MemoryPageStore::new(64)?;
        let index = store.allocate_page()?;
        assert_eq!(index, PageIndex::new(1));

        let mut page = store.read_page(index)?;
        page.overwrite(0, b"row")?;
        store.write_page(&page)?;
        assert_eq!(store.read_page(index)?.read(0, 3)?, b"row");

        store.free_page(index)?;
        assert!(store.read_page(index)?.is_empty());
        assert_eq!(store.allocate_page()?, index);
        Ok(())
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_free_is_logged_once() -> Result<()> {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || -> Result<()> {
            let store = MemoryPageStore::new(64)?;
            let index = store.allocate_page()?;
            store.free_page(index)?;
            store.free_page(index)?;
            Ok(())
        })?;

        let output = String::from_utf8_lossy(&logs.0.lock()).into_owned();
        assert_eq!(output.matches("freed in-memory page").count(), 1);
        Ok(())
    }

    #[test]
    fn test_bounds() -> Result<()> {
        let store = MemoryPageStore::new(64)?;
        assert!(store.read_page(PageIndex::HEADER).is_err());
        assert!(matches!(
            store.read_page(PageIndex::new(1)),
            Err(StorageError::PageNotFound(_))
        ));
        assert!(MemoryPageStore::new(8).is_err());
        Ok(())
    }
}
