//! Data page: a dense array of fixed-width rows.
//!
//! Rows are appended after the count prefix with no free list and no gaps,
//! so capacity is exact: `(page_size - rows_end) / row_size`.

use crate::error::{Result, StorageError};
use crate::page::{DataLayout, Page};
use crate::row::{decode_row, encode_row, Row, RowSchema, Value};
use crate::types::{PageIndex, COUNT_FIELD_SIZE};

/// A page of rows sharing one [`RowSchema`]
#[derive(Debug, Clone)]
pub struct DataPage {
    page: Page,
    schema: RowSchema,
    layout: DataLayout,
}

impl DataPage {
    /// Create an empty data page for `schema`
    pub fn new(index: PageIndex, size: usize, schema: RowSchema) -> Result<Self> {
        Self::from_page(Page::empty(index, size), schema)
    }

    /// Interpret an existing page as a data page of `schema`
    pub fn from_page(page: Page, schema: RowSchema) -> Result<Self> {
        if page.size() < COUNT_FIELD_SIZE {
            return Err(StorageError::invalid_page(format!(
                "page size {} too small for a data page",
                page.size()
            )));
        }
        let layout = DataLayout::read(&page, schema.row_size())?;
        Ok(Self {
            page,
            schema,
            layout,
        })
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

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    pub fn row_count(&self) -> u32 {
        self.layout.row_count
    }

    pub fn capacity_remaining(&self) -> usize {
        self.layout.capacity_remaining()
    }

    pub fn is_full(&self) -> bool {
        self.capacity_remaining() == 0
    }

    /// Append a row (`row_id == None`) or overwrite slot `row_id` in place.
    ///
    /// Returns the slot written.
    pub fn write_row(&mut self, values: &[Value], row_id: Option<u32>) -> Result<u32> {
        match row_id {
            None => {
                if self.is_full() {
                    return Err(StorageError::PageFull {
                        page: self.index(),
                        row_count: self.row_count(),
                        row_size: self.schema.row_size(),
                    });
                }
                let encoded = encode_row(&self.schema, values)?;
                let slot = self.row_count();
                self.page.overwrite(self.layout.rows_end(), &encoded)?;
                self.page.write_u32(0, slot + 1)?;
                self.refresh()?;
                Ok(slot)
            }
            Some(slot) => {
                if slot >= self.row_count() {
                    return Err(StorageError::RowIdOutOfRange {
                        row_id: slot,
                        row_count: self.row_count(),
                    });
                }
                let encoded = encode_row(&self.schema, values)?;
                self.page.overwrite(self.layout.slot_offset(slot), &encoded)?;
                Ok(slot)
            }
        }
    }

    /// Decode the row in `slot`
    pub fn read_row(&self, slot: u32) -> Result<Row> {
        if slot >= self.row_count() {
            return Err(StorageError::RowIdOutOfRange {
                row_id: slot,
                row_count: self.row_count(),
            });
        }
        let bytes = self
            .page
            .read(self.layout.slot_offset(slot), self.schema.row_size())?;
        decode_row(&self.schema, bytes)
    }

    /// Decode every row in slot order
    pub fn read_rows(&self) -> Result<Vec<Row>> {
        (0..self.row_count()).map(|slot| self.read_row(slot)).collect()
    }

    /// Decode the row in the highest slot
    pub fn read_last_row(&self) -> Result<Row> {
        match self.row_count() {
            0 => Err(StorageError::EmptyPage(self.index())),
            count => self.read_row(count - 1),
        }
    }

    fn refresh(&mut self) -> Result<()> {
        self.layout = DataLayout::read(&self.page, self.schema.row_size())?;
        Ok(())
    }
}
