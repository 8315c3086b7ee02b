use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use std::fmt;

const FORBIDDEN_KEY_CHARS: [char; 4] = ['/', '\\', '#', '?'];

fn validate_key(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidKey(format!("{kind} must not be empty")));
    }
    if let Some(c) = value
        .chars()
        .find(|c| FORBIDDEN_KEY_CHARS.contains(c) || c.is_control())
    {
        return Err(Error::InvalidKey(format!(
            "{kind} '{}' contains forbidden character {c:?}",
            value.escape_debug()
        )));
    }
    Ok(())
}

/// Scope under which a storage accessor operates. Fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        validate_key("partition key", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a record within a partition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RowKey(String);

impl RowKey {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        validate_key("row key", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a value handed back by the cache-aside layer came from.
/// Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetrievedFrom {
    #[default]
    Unknown,
    Cache,
    Query,
}

/// Envelope persisted for every row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredRecord {
    pub partition_key: String,
    pub row_key: String,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl StoredRecord {
    pub fn new<T: Serialize>(partition_key: &PartitionKey, row_key: &RowKey, value: &T) -> Result<Self> {
        Ok(Self {
            partition_key: partition_key.as_str().to_string(),
            row_key: row_key.as_str().to_string(),
            timestamp: Utc::now(),
            data: serde_json::to_value(value)?,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes an envelope and checks it belongs to the requested row.
    pub fn from_bytes(bytes: &[u8], partition_key: &PartitionKey, row_key: &RowKey) -> Result<Self> {
        let record: StoredRecord = serde_json::from_slice(bytes)?;
        if record.partition_key != partition_key.as_str() || record.row_key != row_key.as_str() {
            return Err(Error::Corrupt(format!(
                "expected {partition_key}/{row_key}, found {}/{}",
                record.partition_key, record.row_key
            )));
        }
        Ok(record)
    }

    pub fn into_value<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validation() {
        assert!(PartitionKey::new("sessions").is_ok());
        assert!(RowKey::new("user:42").is_ok());

        assert!(matches!(PartitionKey::new(""), Err(Error::InvalidKey(_))));
        assert!(matches!(RowKey::new(""), Err(Error::InvalidKey(_))));
        assert!(matches!(RowKey::new("a/b"), Err(Error::InvalidKey(_))));
        assert!(matches!(RowKey::new("a#b"), Err(Error::InvalidKey(_))));
        assert!(matches!(RowKey::new("line\nbreak"), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_record_rejects_foreign_row() {
        let partition = PartitionKey::new("p").unwrap();
        let record = StoredRecord::new(&partition, &RowKey::new("a").unwrap(), &42u32).unwrap();
        let bytes = record.to_bytes().unwrap();

        let decoded = StoredRecord::from_bytes(&bytes, &partition, &RowKey::new("a").unwrap()).unwrap();
        assert_eq!(decoded.into_value::<u32>().unwrap(), 42);

        let result = StoredRecord::from_bytes(&bytes, &partition, &RowKey::new("b").unwrap());
        assert!(matches!(result, Err(Error::Corrupt(_))));
    }
}
