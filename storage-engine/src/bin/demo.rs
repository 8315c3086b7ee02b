use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use session_storage::{Cacheable, CacheableStorage, RetrievedFrom, StorageFactory};
use shared::config::Config;
use storage_engine::EngineStorageFactory;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct UserProfile {
    user_name: String,
    email: String,
    is_valid: bool,
    #[serde(skip)]
    retrieved_from: RetrievedFrom,
}

impl UserProfile {
    fn named(user_name: &str) -> Self {
        Self {
            user_name: user_name.to_string(),
            email: format!("{user_name}@example.com"),
            ..Self::default()
        }
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    const ROW_KEY: &str = "user:42";

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();
    info!(backend = ?config.backend, partition = %config.partition, "starting session cache demo");

    let store = EngineStorageFactory
        .create_from_config(&config)
        .context("failed to create table store")?;
    let cache = CacheableStorage::new(config.partition.clone(), store)?;

    let profile = cache
        .get_or_compute(ROW_KEY, || async { Ok::<_, anyhow::Error>(UserProfile::named("alice")) })
        .await?;
    info!(user = %profile.user_name, from = ?profile.retrieved_from, "first read");

    let profile: UserProfile = cache
        .get_or_compute(ROW_KEY, || async { bail!("profile service should not be called") })
        .await?;
    info!(user = %profile.user_name, from = ?profile.retrieved_from, "second read");

    let invalidated = cache.invalidate::<UserProfile>(ROW_KEY).await?;
    info!(invalidated, "invalidated {ROW_KEY}");

    let profile = cache
        .get_or_compute(ROW_KEY, || async { Ok::<_, anyhow::Error>(UserProfile::named("alice2")) })
        .await?;
    info!(user = %profile.user_name, from = ?profile.retrieved_from, "read after invalidation");

    Ok(())
}
