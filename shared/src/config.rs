use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Sled,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "moka" => Ok(Backend::Memory),
            "sled" | "disk" => Ok(Backend::Sled),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub backend: Backend,
    pub data_dir: String,
    pub max_entries: Option<u64>,
    pub time_to_live: Option<Duration>,
    pub partition: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            data_dir: Self::DEFAULT_DATA_DIR.to_string(),
            max_entries: None,
            time_to_live: None,
            partition: Self::DEFAULT_PARTITION.to_string(),
        }
    }
}

impl Config {
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_PARTITION: &str = "sessions";

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source, so tests don't touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend = match lookup("SESSION_STORE_BACKEND") {
            Some(raw) => raw.parse::<Backend>().unwrap_or_else(|err| {
                warn!("{err}, falling back to in-memory storage");
                Backend::Memory
            }),
            None => Backend::Memory,
        };

        Self {
            backend,
            data_dir: lookup("SESSION_STORE_DATA_DIR")
                .unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string()),
            max_entries: parse_u64(&lookup, "SESSION_STORE_MAX_ENTRIES"),
            time_to_live: parse_u64(&lookup, "SESSION_STORE_TTL_SECS").map(Duration::from_secs),
            partition: lookup("SESSION_STORE_PARTITION")
                .unwrap_or_else(|| Self::DEFAULT_PARTITION.to_string()),
        }
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{name}='{raw}' is not a valid number, ignoring");
            None
        }
    }
}
