use crate::moka_store::MokaTableStore;
use crate::sled_store::SledTableStore;
use session_storage::{StorageFactory, TableStore};
use shared::Result;
use shared::config::{Backend, Config};
use std::path::Path;
use std::sync::Arc;

const SLED_FILE_NAME: &str = "tables.sled";

/// Builds the table store named by `Config::backend`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineStorageFactory;

impl StorageFactory for EngineStorageFactory {
    fn create_from_config(&self, config: &Config) -> Result<Arc<dyn TableStore>> {
        match config.backend {
            Backend::Memory => Ok(Arc::new(MokaTableStore::new(
                config.partition.clone(),
                config.max_entries,
                config.time_to_live,
            ))),
            Backend::Sled => {
                let path = Path::new(&config.data_dir).join(SLED_FILE_NAME);
                Ok(Arc::new(SledTableStore::new(path)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_builds_memory_store() {
        let store = EngineStorageFactory
            .create_from_config(&Config::default())
            .unwrap();

        store.put("p", "r", b"x".to_vec()).await.unwrap();
        assert_eq!(store.get("p", "r").await.unwrap(), Some(b"x".to_vec()));
    }

    #[test]
    fn test_factory_builds_sled_store_under_data_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config {
            backend: Backend::Sled,
            data_dir: temp_dir.path().to_string_lossy().into_owned(),
            ..Config::default()
        };

        let store = EngineStorageFactory.create_from_config(&config).unwrap();
        store.put_blocking("p", "r", b"y".to_vec()).unwrap();

        assert!(temp_dir.path().join(SLED_FILE_NAME).exists());
        assert_eq!(store.get_blocking("p", "r").unwrap(), Some(b"y".to_vec()));
    }
}
