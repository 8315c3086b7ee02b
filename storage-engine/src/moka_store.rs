use async_trait::async_trait;
use moka::sync::Cache;
use session_storage::TableStore;
use shared::Result;
use std::fmt::Debug;
use std::time::Duration;
use tracing::info;

type RecordKey = (String, String);

/// Moka-backed in-memory table store with optional size bound and TTL.
/// Records past their TTL or evicted for capacity read as absent.
#[derive(Clone)]
pub struct MokaTableStore {
    cache: Cache<RecordKey, Vec<u8>>,
}

impl MokaTableStore {
    /// Create a new unbounded store with optional TTL
    pub fn new_unbounded(time_to_live: Option<Duration>) -> Self {
        Self::new("table-store".to_string(), None, time_to_live)
    }

    /// Create a store from name, optional capacity and optional TTL
    pub fn new(name: String, max_entries: Option<u64>, time_to_live: Option<Duration>) -> Self {
        let mut builder = Cache::builder().name(&name);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        if let Some(ttl) = time_to_live {
            builder = builder.time_to_live(ttl);
        }

        info!(name = %name, ?max_entries, ?time_to_live, "created in-memory table store");

        Self {
            cache: builder.build(),
        }
    }

    fn key(partition_key: &str, row_key: &str) -> RecordKey {
        (partition_key.to_string(), row_key.to_string())
    }
}

#[async_trait]
impl TableStore for MokaTableStore {
    async fn get(&self, partition_key: &str, row_key: &str) -> Result<Option<Vec<u8>>> {
        self.get_blocking(partition_key, row_key)
    }

    async fn put(&self, partition_key: &str, row_key: &str, value: Vec<u8>) -> Result<()> {
        self.put_blocking(partition_key, row_key, value)
    }

    fn get_blocking(&self, partition_key: &str, row_key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.cache.get(&Self::key(partition_key, row_key)))
    }

    fn put_blocking(&self, partition_key: &str, row_key: &str, value: Vec<u8>) -> Result<()> {
        self.cache.insert(Self::key(partition_key, row_key), value);
        Ok(())
    }
}

impl Debug for MokaTableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaTableStore")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
