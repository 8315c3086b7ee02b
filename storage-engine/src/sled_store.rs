use async_trait::async_trait;
use session_storage::TableStore;
use shared::{Error, Result};
use std::path::Path;
use tracing::info;

/// Sled-based table store. Each partition key maps to its own sled tree.
#[derive(Clone)]
pub struct SledTableStore {
    db: sled::Db,
    flush_on_write: bool,
}

impl SledTableStore {
    /// Open (or create) a store at `path`
    /// Creates the parent directory if it doesn't exist
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
        }

        let db = sled::open(path.as_ref())
            .map_err(|e| Error::Storage(format!("Failed to open Sled database: {}", e)))?;

        info!(path = %path.as_ref().display(), "opened sled table store");

        Ok(Self {
            db,
            flush_on_write: true,
        })
    }

    /// Whether every write waits for the data to reach disk. Defaults to true.
    pub fn with_flush_on_write(mut self, flush_on_write: bool) -> Self {
        self.flush_on_write = flush_on_write;
        self
    }

    fn tree(&self, partition_key: &str) -> Result<sled::Tree> {
        self.db
            .open_tree(partition_key)
            .map_err(|e| Error::Storage(format!("Failed to open partition '{}': {}", partition_key, e)))
    }
}

#[async_trait]
impl TableStore for SledTableStore {
    async fn get(&self, partition_key: &str, row_key: &str) -> Result<Option<Vec<u8>>> {
        self.get_blocking(partition_key, row_key)
    }

    async fn put(&self, partition_key: &str, row_key: &str, value: Vec<u8>) -> Result<()> {
        self.put_blocking(partition_key, row_key, value)
    }

    fn get_blocking(&self, partition_key: &str, row_key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .tree(partition_key)?
            .get(row_key.as_bytes())
            .map_err(|e| Error::Storage(format!("Failed to read record: {}", e)))?;

        Ok(value.map(|bytes| bytes.to_vec()))
    }

    fn put_blocking(&self, partition_key: &str, row_key: &str, value: Vec<u8>) -> Result<()> {
        let tree = self.tree(partition_key)?;
        tree.insert(row_key.as_bytes(), value)
            .map_err(|e| Error::Storage(format!("Failed to write record: {}", e)))?;

        if self.flush_on_write {
            tree.flush()
                .map_err(|e| Error::Storage(format!("Failed to flush database: {}", e)))?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for SledTableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledTableStore")
            .field("flush_on_write", &self.flush_on_write)
            .finish()
    }
}
