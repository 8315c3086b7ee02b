use crate::domain::{PartitionKey, RowKey, StoredRecord};
use crate::ports::TableStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::Result;
use std::fmt::Debug;
use std::sync::Arc;

/// Typed record accessor bound to a single partition.
///
/// Values are wrapped in a [`StoredRecord`] and serialized with `serde_json`
/// before reaching the [`TableStore`]. No validity semantics live here.
#[derive(Clone)]
pub struct SessionStorage {
    partition_key: PartitionKey,
    store: Arc<dyn TableStore>,
}

impl SessionStorage {
    pub fn new(partition_key: impl Into<String>, store: Arc<dyn TableStore>) -> Result<Self> {
        Ok(Self {
            partition_key: PartitionKey::new(partition_key)?,
            store,
        })
    }

    pub fn partition_key(&self) -> &PartitionKey {
        &self.partition_key
    }

    /// Fetch the value for `row_key`, or `default` when nothing is stored.
    pub async fn get<T: DeserializeOwned>(&self, row_key: &str, default: T) -> Result<T> {
        Ok(self.get_optional(row_key).await?.unwrap_or(default))
    }

    /// Fetch the value for `row_key`, reporting absence explicitly.
    pub async fn get_optional<T: DeserializeOwned>(&self, row_key: &str) -> Result<Option<T>> {
        let row_key = RowKey::new(row_key)?;
        let bytes = self.store.get(self.partition_key.as_str(), row_key.as_str()).await?;
        self.decode(bytes, &row_key)
    }

    /// Unconditional upsert.
    pub async fn set<T: Serialize>(&self, row_key: &str, value: &T) -> Result<()> {
        let row_key = RowKey::new(row_key)?;
        let bytes = StoredRecord::new(&self.partition_key, &row_key, value)?.to_bytes()?;
        self.store
            .put(self.partition_key.as_str(), row_key.as_str(), bytes)
            .await
    }

    pub fn get_blocking<T: DeserializeOwned>(&self, row_key: &str, default: T) -> Result<T> {
        Ok(self.get_optional_blocking(row_key)?.unwrap_or(default))
    }

    pub fn get_optional_blocking<T: DeserializeOwned>(&self, row_key: &str) -> Result<Option<T>> {
        let row_key = RowKey::new(row_key)?;
        let bytes = self
            .store
            .get_blocking(self.partition_key.as_str(), row_key.as_str())?;
        self.decode(bytes, &row_key)
    }

    pub fn set_blocking<T: Serialize>(&self, row_key: &str, value: &T) -> Result<()> {
        let row_key = RowKey::new(row_key)?;
        let bytes = StoredRecord::new(&self.partition_key, &row_key, value)?.to_bytes()?;
        self.store
            .put_blocking(self.partition_key.as_str(), row_key.as_str(), bytes)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: Option<Vec<u8>>, row_key: &RowKey) -> Result<Option<T>> {
        match bytes {
            Some(bytes) => {
                let record = StoredRecord::from_bytes(&bytes, &self.partition_key, row_key)?;
                Ok(Some(record.into_value()?))
            }
            None => Ok(None),
        }
    }
}

impl Debug for SessionStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStorage")
            .field("partition_key", &self.partition_key)
            .field("store", &"<dyn TableStore>")
            .finish()
    }
}
