//! Table handle over a page store.

use crate::catalog::TableDef;
use crate::error::{Result, StorageError};
use crate::page::{DataPage, MetadataPage};
use crate::row::{Row, RowSchema, Value};
use crate::storage::PageStore;
use crate::types::{PageIndex, COUNT_FIELD_SIZE};
use std::sync::Arc;
use tracing::debug;

/// Handle to a table: its metadata page and its single data page.
///
/// The handle caches only the decoded definition. Every row operation reads
/// the data page from the store, applies the change and writes it back.
pub struct Table {
    store: Arc<dyn PageStore>,
    meta_index: PageIndex,
    data_index: PageIndex,
    def: TableDef,
    schema: RowSchema,
}

impl Table {
    /// Allocate and initialise a new table
    pub fn create(store: Arc<dyn PageStore>, def: TableDef) -> Result<Self> {
        let schema = def.row_schema()?;
        if schema.row_size() > store.page_size() - COUNT_FIELD_SIZE {
            return Err(StorageError::invalid_schema(format!(
                "row of {} bytes does not fit in a {}-byte page",
                schema.row_size(),
                store.page_size()
            )));
        }
        let blob = def.to_ddl()?;

        let meta_index = store.allocate_page()?;
        let data_index = match store.allocate_page() {
            Ok(index) => index,
            Err(e) => {
                store.free_page(meta_index)?;
                return Err(e);
            }
        };

        let mut meta = MetadataPage::new(meta_index, store.page_size())?;
        if let Err(e) = meta.create_table(&blob, data_index) {
            store.free_page(data_index)?;
            store.free_page(meta_index)?;
            return Err(e);
        }
        store.write_page(meta.page())?;

        debug!(
            table = %def.name,
            meta_page = %meta_index,
            data_page = %data_index,
            row_size = schema.row_size(),
            "table created"
        );

        Ok(Self {
            store,
            meta_index,
            data_index,
            def,
            schema,
        })
    }

    /// Open the table whose metadata lives in `meta_index`
    pub fn open(store: Arc<dyn PageStore>, meta_index: PageIndex) -> Result<Self> {
        let meta = MetadataPage::from_page(store.read_page(meta_index)?)?;
        let def = TableDef::from_ddl(meta.schema_blob()?)?;
        let data_index = meta.data_pointer()?;
        let schema = def.row_schema()?;

        Ok(Self {
            store,
            meta_index,
            data_index,
            def,
            schema,
        })
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn def(&self) -> &TableDef {
        &self.def
    }

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    /// Index of the metadata page; this is the table's address
    pub fn meta_index(&self) -> PageIndex {
        self.meta_index
    }

    pub fn data_index(&self) -> PageIndex {
        self.data_index
    }

    fn load_data(&self) -> Result<DataPage> {
        DataPage::from_page(self.store.read_page(self.data_index)?, self.schema.clone())
    }

    /// Append a row, returning its row id
    pub fn insert(&self, row: &[Value]) -> Result<u32> {
        let mut data = self.load_data()?;
        let row_id = data.write_row(row, None)?;
        self.store.write_page(data.page())?;

        debug!(table = %self.def.name, row_id, "row inserted");
        Ok(row_id)
    }

    /// Replace the row with id `row_id`
    pub fn update(&self, row_id: u32, row: &[Value]) -> Result<()> {
        let mut data = self.load_data()?;
        data.write_row(row, Some(row_id))?;
        self.store.write_page(data.page())?;

        debug!(table = %self.def.name, row_id, "row updated");
        Ok(())
    }

    pub fn get(&self, row_id: u32) -> Result<Row> {
        self.load_data()?.read_row(row_id)
    }

    /// All rows in row id order
    pub fn scan(&self) -> Result<Vec<Row>> {
        self.load_data()?.read_rows()
    }

    pub fn last_row(&self) -> Result<Row> {
        self.load_data()?.read_last_row()
    }

    pub fn row_count(&self) -> Result<u32> {
        Ok(self.load_data()?.row_count())
    }

    pub fn capacity_remaining(&self) -> Result<usize> {
        Ok(self.load_data()?.capacity_remaining())
    }

    /// Clear the definition and release both pages
    pub fn drop_table(self) -> Result<()> {
        let mut meta = MetadataPage::from_page(self.store.read_page(self.meta_index)?)?;
        meta.drop_table()?;
        self.store.write_page(meta.page())?;

        self.store.free_page(self.meta_index)?;
        self.store.free_page(self.data_index)?;

        debug!(table = %self.def.name, meta_page = %self.meta_index, "table dropped");
        Ok(())
    }
}
