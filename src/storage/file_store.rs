//! File-backed page store.
//!
//! The file is a plain array of pages. Page 0 holds the [`FileHeader`];
//! page `i` starts at byte `i * page_size`.

use crate::error::{Result, StorageError};
use crate::page::Page;
use crate::storage::{FileHeader, FreeList, PageStore, FILE_HEADER_SIZE};
use crate::types::{validate_page_size, PageIndex};
use parking_lot::{Mutex, RwLock};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Page store backed by a single file
pub struct FilePageStore {
    /// The store file
    file: RwLock<File>,
    /// The file header (cached)
    header: RwLock<FileHeader>,
    /// Freed pages awaiting reuse
    free_list: Mutex<FreeList>,
    /// Fixed for the lifetime of the file
    page_size: usize,
    /// Whether to sync on each write
    sync_on_write: bool,
}

impl FilePageStore {
    /// Open an existing store file or create a new one.
    ///
    /// `page_size` only applies to new files; an existing file keeps the
    /// page size recorded in its header.
    pub fn open(path: &Path, page_size: usize, sync_on_write: bool) -> Result<Self> {
        validate_page_size(page_size)?;
        let exists = path.exists();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = if exists { file.metadata()?.len() } else { 0 };
        if len > 0 && len < FILE_HEADER_SIZE as u64 {
            return Err(StorageError::invalid_db(format!(
                "file of {} bytes is too short for a store header",
                len
            )));
        }

        let header = if len > 0 {
            let mut file_ref = &file;
            let mut buf = vec![0u8; FILE_HEADER_SIZE];
            file_ref.seek(SeekFrom::Start(0))?;
            file_ref.read_exact(&mut buf)?;
            let header = FileHeader::read(&buf)?;

            let expected_len = header.page_count as u64 * header.page_size as u64;
            if file.metadata()?.len() < expected_len {
                return Err(StorageError::invalid_db(format!(
                    "file shorter than {} pages of {} bytes",
                    header.page_count, header.page_size
                )));
            }
            if header.page_size as usize != page_size {
                warn!(
                    path = %path.display(),
                    configured = page_size,
                    stored = header.page_size,
                    "ignoring configured page size for existing store"
                );
            }
            debug!(
                path = %path.display(),
                page_size = header.page_size,
                page_count = header.page_count,
                "opened store"
            );
            header
        } else {
            let header = FileHeader::new(page_size);
            let mut buf = vec![0u8; page_size];
            header.write(&mut buf);

            let mut file_ref = &file;
            file_ref.seek(SeekFrom::Start(0))?;
            file_ref.write_all(&buf)?;
            file_ref.sync_all()?;

            debug!(path = %path.display(), page_size, "created store");
            header
        };

        Ok(Self {
            file: RwLock::new(file),
            page_size: header.page_size as usize,
            header: RwLock::new(header),
            free_list: Mutex::new(FreeList::new()),
            sync_on_write,
        })
    }

    /// Current file header
    pub fn header(&self) -> FileHeader {
        *self.header.read()
    }

    /// Reject the header page and indices past the end of the file
    fn check_index(&self, index: PageIndex) -> Result<()> {
        if index == PageIndex::HEADER {
            return Err(StorageError::invalid_operation(
                "cannot access header page directly",
            ));
        }
        if index.value() >= self.header.read().page_count {
            return Err(StorageError::PageNotFound(index));
        }
        Ok(())
    }

    fn write_at(&self, index: PageIndex, data: &[u8]) -> Result<()> {
        let mut file = self.file.write();
        file.seek(SeekFrom::Start(index.byte_offset(self.page_size)))?;
        file.write_all(data)?;

        if self.sync_on_write {
            file.sync_data()?;
        }
        Ok(())
    }

    /// Flush the header to disk
    fn flush_header(&self) -> Result<()> {
        let mut buf = vec![0u8; FILE_HEADER_SIZE];
        self.header.read().write(&mut buf);
        self.write_at(PageIndex::HEADER, &buf)
    }
}

impl PageStore for FilePageStore {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn read_page(&self, index: PageIndex) -> Result<Page> {
        self.check_index(index)?;

        let mut buf = vec![0u8; self.page_size];
        let mut file = self.file.write();
        file.seek(SeekFrom::Start(index.byte_offset(self.page_size)))?;
        file.read_exact(&mut buf)?;

        Page::from_bytes(index, self.page_size, buf)
    }

    fn write_page(&self, page: &Page) -> Result<()> {
        self.check_index(page.index())?;

        if page.size() != self.page_size {
            return Err(StorageError::invalid_page(format!(
                "page data must be {} bytes, got {}",
                self.page_size,
                page.size()
            )));
        }

        self.write_at(page.index(), page.as_bytes())
    }

    fn allocate_page(&self) -> Result<PageIndex> {
        if let Some(index) = self.free_list.lock().pop() {
            debug!(page = %index, "reusing freed page");
            return Ok(index);
        }

        let mut header = self.header.write();
        let mut extended = *header;
        let index = PageIndex::new(extended.extend());
        self.write_at(index, &vec![0u8; self.page_size])?;
        *header = extended;
        drop(header);
        self.flush_header()?;

        debug!(page = %index, "allocated page");
        Ok(index)
    }

    fn free_page(&self, index: PageIndex) -> Result<()> {
        self.check_index(index)?;

        self.write_at(index, &vec![0u8; self.page_size])?;
        if self.free_list.lock().push(index) {
            debug!(page = %index, "freed page");
        }
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.header.read().page_count
    }

    fn free_page_count(&self) -> usize {
        self.free_list.lock().len()
    }

    fn sync(&self) -> Result<()> {
        self.flush_header()?;
        self.file.write().sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_new_store() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let store = FilePageStore::open(&path, 64, false)?;
        assert_eq!(store.page_size(), 64);
        assert_eq!(store.page_count(), 1);
        assert_eq!(std::fs::metadata(&path)?.len(), 64);
        Ok(())
    }

    #[test]
    fn test_allocate_write_read() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = FilePageStore::open(&dir.path().join("test.db"), 64, false)?;

        let index = store.allocate_page()?;
        assert_eq!(index, PageIndex::new(1));
        assert!(store.read_page(index)?.is_empty());

        let mut page = Page::empty(index, 64);
        page.overwrite(0, b"hello")?;
        store.write_page(&page)?;

        assert_eq!(store.read_page(index)?.read(0, 5)?, b"hello");
        Ok(())
    }

    #[test]
    fn test_header_and_missing_pages_rejected() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = FilePageStore::open(&dir.path().join("test.db"), 64, false)?;

        assert!(matches!(
            store.read_page(PageIndex::HEADER),
            Err(StorageError::InvalidOperation(_))
        ));
        assert!(matches!(
            store.read_page(PageIndex::new(5)),
            Err(StorageError::PageNotFound(_))
        ));

        let index = store.allocate_page()?;
        assert!(matches!(
            store.write_page(&Page::empty(index, 32)),
            Err(StorageError::InvalidPage(_))
        ));
        Ok(())
    }

    #[test]
    fn test_reopen_keeps_pages_and_page_size() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let store = FilePageStore::open(&path, 128, true)?;
            let index = store.allocate_page()?;
            let mut page = Page::empty(index, 128);
            page.overwrite(120, b"tail")?;
            store.write_page(&page)?;
            store.sync()?;
        }

        {
            // Configured size is ignored for an existing file
            let store = FilePageStore::open(&path, 4096, false)?;
            assert_eq!(store.page_size(), 128);
            assert_eq!(store.page_count(), 2);
            assert_eq!(store.read_page(PageIndex::new(1))?.read(120, 4)?, b"tail");
        }
        Ok(())
    }

    #[test]
    fn test_free_zeroes_and_reuses() -> Result<()> {
        let dir = tempdir().unwrap();
        let store = FilePageStore::open(&dir.path().join("test.db"), 64, false)?;

        let p1 = store.allocate_page()?;
        let p2 = store.allocate_page()?;
        let p3 = store.allocate_page()?;
        assert_eq!((p1.value(), p2.value(), p3.value()), (1, 2, 3));

        let mut page = Page::empty(p2, 64);
        page.overwrite(0, &[0xAA; 64])?;
        store.write_page(&page)?;

        store.free_page(p2)?;
        store.free_page(p2)?;
        assert_eq!(store.free_page_count(), 1);
        assert!(store.read_page(p2)?.is_empty());

        assert_eq!(store.allocate_page()?, p2);
        assert_eq!(store.free_page_count(), 0);
        assert_eq!(store.allocate_page()?, PageIndex::new(4));
        Ok(())
    }

    #[test]
    fn test_page_count_tracks_file_length() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let store = FilePageStore::open(&path, 64, false)?;

        for _ in 0..3 {
            let index = store.allocate_page()?;
            assert_eq!(index.value() + 1, store.page_count());
            assert_eq!(std::fs::metadata(&path)?.len(), store.page_count() as u64 * 64);
            assert!(store.read_page(index)?.is_empty());
        }
        assert!(store.read_page(PageIndex::new(store.page_count())).is_err());
        Ok(())
    }

    #[test]
    fn test_rejects_foreign_file() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("junk.db");
        std::fs::write(&path, vec![0x5Au8; 256])?;

        assert!(matches!(
            FilePageStore::open(&path, 64, false),
            Err(StorageError::InvalidDatabaseFile(_))
        ));
        Ok(())
    }

    #[test]
    fn test_short_file_left_untouched() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"important")?;

        assert!(matches!(
            FilePageStore::open(&path, 64, false),
            Err(StorageError::InvalidDatabaseFile(_))
        ));
        assert_eq!(std::fs::read(&path)?, b"important");
        Ok(())
    }

    #[test]
    fn test_empty_file_initialized() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.db");
        std::fs::write(&path, b"")?;

        let store = FilePageStore::open(&path, 64, false)?;
        assert_eq!(store.page_count(), 1);
        assert_eq!(std::fs::metadata(&path)?.len(), 64);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_page_size() {
        let dir = tempdir().unwrap();
        assert!(FilePageStore::open(&dir.path().join("a.db"), 16, false).is_err());
    }
}
