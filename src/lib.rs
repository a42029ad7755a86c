//! # Block Storage
//!
//! The lowest layer of a small disk-oriented relational engine: uniform
//! fixed-size pages, a page format that stores a table's DDL plus a pointer
//! to its data, and a page format that stores a dense array of fixed-width
//! rows.
//!
//! ## Architecture
//!
//! - **Page Layer** (`page`): the [`Page`] buffer and the [`MetadataPage`] /
//!   [`DataPage`] formats
//! - **Row Layer** (`row`): fixed-width row schemas and the row codec
//! - **Storage Layer** (`storage`): page stores mapping a page index to a
//!   slot of a file or of memory
//! - **Catalog** (`catalog`): table definitions (the DDL blob) and table
//!   handles
//!
//! ## Usage
//!
//! ```rust,ignore
//! use block_storage::{Config, Db, TableDef, Value};
//!
//! let db = Db::open(Config::new("my_store.db"))?;
//!
//! let def = TableDef::from_specs("users", &["id:int4", "name:text16"])?;
//! let table = db.create_table(def)?;
//! table.insert(&[Value::Int(1), Value::from("ann")])?;
//!
//! for row in table.scan()? {
//!     println!("{:?}", row);
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod page;
pub mod row;
pub mod storage;
pub mod types;

pub use catalog::{ColumnDef, Table, TableDef};
pub use error::{Result, StorageError};
pub use page::{DataPage, MetadataPage, Page, TableState};
pub use row::{FieldKind, Row, RowSchema, Value};
pub use storage::{FilePageStore, MemoryPageStore, PageStore};
pub use types::{PageIndex, DEFAULT_PAGE_SIZE};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Path to the store file
    pub path: PathBuf,
    /// Page size for new stores (default: 4096)
    pub page_size: usize,
    /// Whether to sync writes immediately (default: false for performance)
    pub sync_on_write: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new("blocks.db")
    }
}

impl Config {
    /// Create a new configuration with default settings
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            page_size: DEFAULT_PAGE_SIZE,
            sync_on_write: false,
        }
    }

    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        types::validate_page_size(config.page_size)?;
        Ok(config)
    }

    /// Set page size
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Enable sync on write for durability
    pub fn sync_on_write(mut self, enabled: bool) -> Self {
        self.sync_on_write = enabled;
        self
    }
}

/// Database handle: a page store plus table lifecycle on top of it
pub struct Db {
    store: Arc<dyn PageStore>,
}

impl Db {
    /// Open or create a file-backed store
    pub fn open(config: Config) -> Result<Self> {
        let store = FilePageStore::open(&config.path, config.page_size, config.sync_on_write)?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Create a store that lives only in memory
    pub fn in_memory(page_size: usize) -> Result<Self> {
        Ok(Self {
            store: Arc::new(MemoryPageStore::new(page_size)?),
        })
    }

    /// Wrap an existing page store
    pub fn with_store(store: Arc<dyn PageStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PageStore> {
        &self.store
    }

    /// Create a table; its address is [`Table::meta_index`]
    pub fn create_table(&self, def: TableDef) -> Result<Table> {
        Table::create(Arc::clone(&self.store), def)
    }

    /// Open the table whose metadata page is `meta_index`
    pub fn table(&self, meta_index: PageIndex) -> Result<Table> {
        Table::open(Arc::clone(&self.store), meta_index)
    }

    /// Drop the table whose metadata page is `meta_index`
    pub fn drop_table(&self, meta_index: PageIndex) -> Result<()> {
        self.table(meta_index)?.drop_table()
    }

    /// Flush the store to durable storage
    pub fn flush(&self) -> Result<()> {
        self.store.sync()
    }

    pub fn stats(&self) -> DbStats {
        DbStats {
            page_size: self.store.page_size(),
            page_count: self.store.page_count(),
            free_pages: self.store.free_page_count(),
        }
    }
}

/// Store statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStats {
    /// Size of every page
    pub page_size: usize,
    /// Total pages, including the header page
    pub page_count: u32,
    /// Freed pages awaiting reuse
    pub free_pages: usize,
}
