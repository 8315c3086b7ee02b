//! In-memory `TableStore` double that counts calls and can be told to fail.

use crate::cacheable::Cacheable;
use crate::domain::RetrievedFrom;
use crate::ports::TableStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct RecordingStore {
    rows: Mutex<HashMap<(String, String), Vec<u8>>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self, partition_key: &str, row_key: &str) -> Option<Vec<u8>> {
        self.rows
            .lock()
            .get(&(partition_key.to_string(), row_key.to_string()))
            .cloned()
    }

    fn read(&self, partition_key: &str, row_key: &str) -> Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Storage("read refused".to_string()));
        }
        Ok(self.raw(partition_key, row_key))
    }

    fn write(&self, partition_key: &str, row_key: &str, value: Vec<u8>) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Storage("write refused".to_string()));
        }
        self.rows
            .lock()
            .insert((partition_key.to_string(), row_key.to_string()), value);
        Ok(())
    }
}

#[async_trait]
impl TableStore for RecordingStore {
    async fn get(&self, partition_key: &str, row_key: &str) -> Result<Option<Vec<u8>>> {
        self.read(partition_key, row_key)
    }

    async fn put(&self, partition_key: &str, row_key: &str, value: Vec<u8>) -> Result<()> {
        self.write(partition_key, row_key, value)
    }

    fn get_blocking(&self, partition_key: &str, row_key: &str) -> Result<Option<Vec<u8>>> {
        self.read(partition_key, row_key)
    }

    fn put_blocking(&self, partition_key: &str, row_key: &str, value: Vec<u8>) -> Result<()> {
        self.write(partition_key, row_key, value)
    }
}

/// Hypothetical user profile used across the unit tests.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_name: String,
    pub email: String,
    pub time_zone_offset: i32,
    pub permissions: i64,
    pub is_valid: bool,
    #[serde(skip)]
    pub retrieved_from: RetrievedFrom,
}

impl UserProfile {
    pub fn named(user_name: &str) -> Self {
        Self {
            user_name: user_name.to_string(),
            email: format!("{user_name}@example.com"),
            ..Self::default()
        }
    }
}

// Transient marker excluded from equality.
impl PartialEq for UserProfile {
    fn eq(&self, other: &Self) -> bool {
        self.user_name == other.user_name
            && self.email == other.email
            && self.time_zone_offset == other.time_zone_offset
            && self.permissions == other.permissions
            && self.is_valid == other.is_valid
    }
}

impl Cacheable for UserProfile {
    fn is_valid(&self) -> bool {
        self.is_valid
    }

    fn set_valid(&mut self, valid: bool) {
        self.is_valid = valid;
    }

    fn set_retrieved_from(&mut self, from: RetrievedFrom) {
        self.retrieved_from = from;
    }
}
