//! Cache-aside helpers over a partitioned key-value store.
//!
//! [`CacheableStorage`] reads a row, returns it when its validity flag is set,
//! and otherwise computes, stores and returns a fresh value. Invalidation
//! clears the flag in place instead of deleting the row.

pub mod cacheable;
pub mod domain;
pub mod ports;
pub mod storage;

#[cfg(test)]
mod testing;

pub use cacheable::{Cacheable, CacheableStorage};
pub use domain::{PartitionKey, RetrievedFrom, RowKey, StoredRecord};
pub use ports::{StorageFactory, TableStore};
pub use storage::SessionStorage;
