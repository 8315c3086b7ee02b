use crate::domain::RetrievedFrom;
use crate::ports::TableStore;
use crate::storage::SessionStorage;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::Error;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// A value that carries its own validity flag and can be handled cache-aside.
///
/// `is_valid() == false` means the record is stored but stale and must be
/// recomputed before use. Implementors that track where a value was read from
/// can override [`Cacheable::set_retrieved_from`]; the marker is transient and
/// should be excluded from serialization.
pub trait Cacheable: Serialize + DeserializeOwned + Send + Sync {
    fn is_valid(&self) -> bool;

    fn set_valid(&mut self, valid: bool);

    fn set_retrieved_from(&mut self, _from: RetrievedFrom) {}
}

/// Read-through caching and soft invalidation over a [`SessionStorage`].
///
/// Nothing here locks or coordinates: two concurrent misses on one row both
/// run their compute function and the last write wins. Failures from the
/// store or the compute function are returned as-is, never retried.
#[derive(Clone, Debug)]
pub struct CacheableStorage {
    storage: SessionStorage,
}

impl CacheableStorage {
    pub fn new(partition_key: impl Into<String>, store: Arc<dyn TableStore>) -> shared::Result<Self> {
        Ok(Self::from_storage(SessionStorage::new(partition_key, store)?))
    }

    pub fn from_storage(storage: SessionStorage) -> Self {
        Self { storage }
    }

    /// Underlying accessor, for reads and writes that bypass validity handling.
    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    /// Return the cached value for `row_key` if it is valid, otherwise run
    /// `compute`, store its result as valid and return it.
    pub async fn get_or_compute<T, F, Fut, E>(&self, row_key: &str, compute: F) -> Result<T, E>
    where
        T: Cacheable + Default,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<Error>,
    {
        self.get_or_compute_with_default(row_key, compute, T::default())
            .await
    }

    /// Like [`get_or_compute`](Self::get_or_compute), substituting `default`
    /// for an absent record. A valid `default` is returned without computing.
    pub async fn get_or_compute_with_default<T, F, Fut, E>(
        &self,
        row_key: &str,
        compute: F,
        default: T,
    ) -> Result<T, E>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<Error>,
    {
        let mut cached = self.storage.get(row_key, default).await?;
        if cached.is_valid() {
            debug!(partition = %self.storage.partition_key(), row_key, "cache hit");
            cached.set_retrieved_from(RetrievedFrom::Cache);
            return Ok(cached);
        }

        debug!(partition = %self.storage.partition_key(), row_key, "cache miss, computing");
        let computed = compute().await?;
        let mut stored = self.set(row_key, computed).await?;
        stored.set_retrieved_from(RetrievedFrom::Query);
        Ok(stored)
    }

    /// Mark `data` valid and store it, overwriting any previous record.
    pub async fn set<T: Cacheable>(&self, row_key: &str, mut data: T) -> shared::Result<T> {
        data.set_valid(true);
        self.storage.set(row_key, &data).await?;
        debug!(partition = %self.storage.partition_key(), row_key, "stored valid record");
        Ok(data)
    }

    /// Rewrite the stored record with its validity flag cleared, keeping the payload.
    ///
    /// A stored value equal to `T::default()` is treated as "nothing there" and
    /// left untouched, so a legitimately stored default value is never
    /// invalidated. Returns whether a write happened.
    pub async fn invalidate<T>(&self, row_key: &str) -> shared::Result<bool>
    where
        T: Cacheable + Default + PartialEq,
    {
        let current: T = self.storage.get(row_key, T::default()).await?;
        if current == T::default() {
            debug!(partition = %self.storage.partition_key(), row_key, "nothing to invalidate");
            return Ok(false);
        }
        self.write_invalid(row_key, current).await
    }

    /// Like [`invalidate`](Self::invalidate), but decides by record presence
    /// instead of equality with the default value.
    pub async fn invalidate_if_present<T: Cacheable>(&self, row_key: &str) -> shared::Result<bool> {
        match self.storage.get_optional::<T>(row_key).await? {
            Some(current) => self.write_invalid(row_key, current).await,
            None => {
                debug!(partition = %self.storage.partition_key(), row_key, "no record to invalidate");
                Ok(false)
            }
        }
    }

    async fn write_invalid<T: Cacheable>(&self, row_key: &str, mut current: T) -> shared::Result<bool> {
        current.set_valid(false);
        self.storage.set(row_key, &current).await?;
        debug!(partition = %self.storage.partition_key(), row_key, "invalidated");
        Ok(true)
    }

    pub fn get_or_compute_blocking<T, F, E>(&self, row_key: &str, compute: F) -> Result<T, E>
    where
        T: Cacheable + Default,
        F: FnOnce() -> Result<T, E>,
        E: From<Error>,
    {
        self.get_or_compute_with_default_blocking(row_key, compute, T::default())
    }

    pub fn get_or_compute_with_default_blocking<T, F, E>(
        &self,
        row_key: &str,
        compute: F,
        default: T,
    ) -> Result<T, E>
    where
        T: Cacheable,
        F: FnOnce() -> Result<T, E>,
        E: From<Error>,
    {
        let mut cached = self.storage.get_blocking(row_key, default)?;
        if cached.is_valid() {
            debug!(partition = %self.storage.partition_key(), row_key, "cache hit");
            cached.set_retrieved_from(RetrievedFrom::Cache);
            return Ok(cached);
        }

        debug!(partition = %self.storage.partition_key(), row_key, "cache miss, computing");
        let computed = compute()?;
        let mut stored = self.set_blocking(row_key, computed)?;
        stored.set_retrieved_from(RetrievedFrom::Query);
        Ok(stored)
    }

    pub fn set_blocking<T: Cacheable>(&self, row_key: &str, mut data: T) -> shared::Result<T> {
        data.set_valid(true);
        self.storage.set_blocking(row_key, &data)?;
        debug!(partition = %self.storage.partition_key(), row_key, "stored valid record");
        Ok(data)
    }

    pub fn invalidate_blocking<T>(&self, row_key: &str) -> shared::Result<bool>
    where
        T: Cacheable + Default + PartialEq,
    {
        let current: T = self.storage.get_blocking(row_key, T::default())?;
        if current == T::default() {
            debug!(partition = %self.storage.partition_key(), row_key, "nothing to invalidate");
            return Ok(false);
        }
        self.write_invalid_blocking(row_key, current)
    }

    pub fn invalidate_if_present_blocking<T: Cacheable>(&self, row_key: &str) -> shared::Result<bool> {
        match self.storage.get_optional_blocking::<T>(row_key)? {
            Some(current) => self.write_invalid_blocking(row_key, current),
            None => {
                debug!(partition = %self.storage.partition_key(), row_key, "no record to invalidate");
                Ok(false)
            }
        }
    }

    fn write_invalid_blocking<T: Cacheable>(&self, row_key: &str, mut current: T) -> shared::Result<bool> {
        current.set_valid(false);
        self.storage.set_blocking(row_key, &current)?;
        debug!(partition = %self.storage.partition_key(), row_key, "invalidated");
        Ok(true)
    }
}
