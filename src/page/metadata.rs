//! Metadata page: a table's schema blob and the pointer to its data.
//!
//! The page is `Absent` while all-zero and `Populated` after
//! [`MetadataPage::create_table`]. Dropping the table zeroes the page again.

use crate::error::{Result, StorageError};
use crate::page::{MetadataLayout, Page};
use crate::types::{PageIndex, LEN_FIELD_SIZE, POINTER_FIELD_SIZE};

/// Whether a metadata page currently describes a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Absent,
    Populated,
}

/// A page holding one table definition
#[derive(Debug, Clone)]
pub struct MetadataPage {
    page: Page,
    layout: MetadataLayout,
}

impl MetadataPage {
    /// Create an empty (absent) metadata page
    pub fn new(index: PageIndex, size: usize) -> Result<Self> {
        Self::from_page(Page::empty(index, size))
    }

    /// Interpret an existing page as a metadata page
    pub fn from_page(page: Page) -> Result<Self> {
        if page.size() < LEN_FIELD_SIZE + POINTER_FIELD_SIZE {
            return Err(StorageError::invalid_page(format!(
                "page size {} too small for a metadata page",
                page.size()
            )));
        }

        let layout = MetadataLayout::read(&page)?;
        if !page.is_empty() && layout.end() > page.size() {
            return Err(StorageError::corruption(format!(
                "metadata page {}: schema of {} bytes overruns page of {} bytes",
                page.index(),
                layout.ddl_size,
                page.size()
            )));
        }
        Ok(Self { page, layout })
    }

    pub fn index(&self) -> PageIndex {
        self.page.index()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn into_page(self) -> Page {
        self.page
    }

    pub fn is_empty(&self) -> bool {
        self.page.is_empty()
    }

    pub fn state(&self) -> TableState {
        if self.is_empty() {
            TableState::Absent
        } else {
            TableState::Populated
        }
    }

    /// Store a table definition, replacing any previous one.
    ///
    /// Fails with `SchemaTooLarge` if the blob, its length prefix and the
    /// pointer do not fit in the page; the page is left unchanged.
    pub fn create_table(&mut self, schema_blob: &[u8], data_pointer: PageIndex) -> Result<()> {
        let required = MetadataLayout::required_size(schema_blob.len());
        if required > self.page.size() {
            return Err(StorageError::SchemaTooLarge {
                size: schema_blob.len(),
                max: MetadataLayout::max_blob_size(self.page.size()),
            });
        }
        let ddl_size = u32::try_from(schema_blob.len()).map_err(|_| StorageError::SchemaTooLarge {
            size: schema_blob.len(),
            max: MetadataLayout::max_blob_size(self.page.size()),
        })?;

        let mut buf = Vec::with_capacity(required);
        buf.extend_from_slice(&ddl_size.to_be_bytes());
        buf.extend_from_slice(schema_blob);
        buf.extend_from_slice(&data_pointer.value().to_be_bytes());

        self.page.free();
        self.page.overwrite(0, &buf)?;
        self.refresh()
    }

    /// Remove the table definition
    pub fn drop_table(&mut self) -> Result<()> {
        self.page.free();
        self.refresh()
    }

    /// Index of the table's first data page
    pub fn data_pointer(&self) -> Result<PageIndex> {
        if self.state() == TableState::Absent {
            return Err(StorageError::NotPopulated(self.index()));
        }
        Ok(PageIndex::new(self.page.read_u32(self.layout.pointer_start())?))
    }

    /// Repoint the table at a different first data page
    pub fn set_data_pointer(&mut self, data_pointer: PageIndex) -> Result<()> {
        if self.state() == TableState::Absent {
            return Err(StorageError::NotPopulated(self.index()));
        }
        self.page
            .write_u32(self.layout.pointer_start(), data_pointer.value())
    }

    /// The stored schema blob, verbatim
    pub fn schema_blob(&self) -> Result<&[u8]> {
        if self.is_empty() {
            return Err(StorageError::NoMetadata(self.index()));
        }
        self.page
            .read(self.layout.ddl_start(), self.layout.ddl_size as usize)
    }

    fn refresh(&mut self) -> Result<()> {
        self.layout = MetadataLayout::read(&self.page)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: usize = 64;

    #[test]
    fn test_new_page_is_absent() -> Result<()> {
        let meta = MetadataPage::new(PageIndex::new(1), PAGE)?;
        assert_eq!(meta.state(), TableState::Absent);
        assert!(matches!(meta.schema_blob(), Err(StorageError::NoMetadata(_))));
        assert!(matches!(meta.data_pointer(), Err(StorageError::NotPopulated(_))));
        Ok(())
    }

    #[test]
    fn test_create_and_read_back() -> Result<()> {
        let mut meta = MetadataPage::new(PageIndex::new(1), PAGE)?;
        meta.create_table(b"CREATE TABLE t", PageIndex::new(9))?;

        assert_eq!(meta.state(), TableState::Populated);
        assert_eq!(meta.schema_blob()?, b"CREATE TABLE t");
        assert_eq!(meta.data_pointer()?, PageIndex::new(9));

        // Survives a trip through raw bytes
        let bytes = meta.page().as_bytes().to_vec();
        let restored = MetadataPage::from_page(Page::from_bytes(PageIndex::new(1), PAGE, bytes)?)?;
        assert_eq!(restored.schema_blob()?, b"CREATE TABLE t");
        assert_eq!(restored.data_pointer()?, PageIndex::new(9));
        Ok(())
    }

    #[test]
    fn test_blob_size_boundary() -> Result<()> {
        let mut meta = MetadataPage::new(PageIndex::new(1), PAGE)?;
        meta.create_table(&[b'x'; 50], PageIndex::new(2))?;
        assert_eq!(meta.schema_blob()?.len(), 50);

        let mut meta = MetadataPage::new(PageIndex::new(1), PAGE)?;
        assert!(matches!(
            meta.create_table(&[b'x'; 58], PageIndex::new(2)),
            Err(StorageError::SchemaTooLarge { size: 58, max: 56 })
        ));
        assert_eq!(meta.state(), TableState::Absent);
        Ok(())
    }

    #[test]
    fn test_fits_check_for_every_blob_length() -> Result<()> {
        for len in 0..=PAGE + 1 {
            let mut meta = MetadataPage::new(PageIndex::new(1), PAGE)?;
            let result = meta.create_table(&vec![0xAB; len], PageIndex::new(3));
            let fits = LEN_FIELD_SIZE + len + POINTER_FIELD_SIZE <= PAGE;
            assert_eq!(result.is_ok(), fits, "blob length {}", len);
            if !fits {
                assert!(matches!(result, Err(StorageError::SchemaTooLarge { .. })));
            }
        }
        Ok(())
    }

    #[test]
    fn test_recreate_in_place_with_smaller_blob() -> Result<()> {
        let mut meta = MetadataPage::new(PageIndex::new(1), PAGE)?;
        meta.create_table(&[b'a'; 40], PageIndex::new(2))?;
        meta.create_table(b"short", PageIndex::new(5))?;

        assert_eq!(meta.schema_blob()?, b"short");
        assert_eq!(meta.data_pointer()?, PageIndex::new(5));
        assert!(meta.page().as_bytes()[4 + 5 + 4..].iter().all(|&b| b == 0));
        Ok(())
    }

    #[test]
    fn test_drop_table_returns_to_absent() -> Result<()> {
        let mut meta = MetadataPage::new(PageIndex::new(1), PAGE)?;
        meta.create_table(b"ddl", PageIndex::new(4))?;
        meta.drop_table()?;

        assert_eq!(meta.state(), TableState::Absent);
        assert!(meta.is_empty());
        assert!(meta.schema_blob().is_err());

        meta.create_table(b"again", PageIndex::new(6))?;
        assert_eq!(meta.state(), TableState::Populated);
        Ok(())
    }

    #[test]
    fn test_set_data_pointer() -> Result<()> {
        let mut meta = MetadataPage::new(PageIndex::new(1), PAGE)?;
        assert!(meta.set_data_pointer(PageIndex::new(3)).is_err());

        meta.create_table(b"ddl", PageIndex::new(4))?;
        meta.set_data_pointer(PageIndex::new(12))?;
        assert_eq!(meta.data_pointer()?, PageIndex::new(12));
        assert_eq!(meta.schema_blob()?, b"ddl");
        Ok(())
    }

    #[test]
    fn test_overrunning_prefix_is_corruption() -> Result<()> {
        let mut page = Page::empty(PageIndex::new(1), PAGE);
        page.write_u32(0, 60)?;
        assert!(matches!(
            MetadataPage::from_page(page),
            Err(StorageError::Corruption(_))
        ));
        Ok(())
    }
}
