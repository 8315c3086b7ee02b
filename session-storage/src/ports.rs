#![deny(clippy::all)]

use async_trait::async_trait;
use shared::Result;
use shared::config::Config;
use std::sync::Arc;

// Ports are the pluggable extension points for the underlying key-value service

/// Port for creating a table store from configuration
/// This allows different storage backends to be plugged in
pub trait StorageFactory: Send + Sync + 'static {
    /// Create a new table store from configuration
    fn create_from_config(&self, config: &Config) -> Result<Arc<dyn TableStore>>;
}

/// Port for raw record access, addressed by partition key and row key.
///
/// Records are opaque bytes at this level; `Ok(None)` means no record exists.
/// Writes are unconditional upserts. The `*_blocking` forms hold the calling
/// thread for the duration of the backend call.
#[async_trait]
pub trait TableStore: Send + Sync + 'static {
    async fn get(&self, partition_key: &str, row_key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, partition_key: &str, row_key: &str, value: Vec<u8>) -> Result<()>;

    fn get_blocking(&self, partition_key: &str, row_key: &str) -> Result<Option<Vec<u8>>>;
    fn put_blocking(&self, partition_key: &str, row_key: &str, value: Vec<u8>) -> Result<()>;
}
