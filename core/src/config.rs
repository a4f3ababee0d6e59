use crate::error::{Error, Result};
use crate::store::{MemoryStore, SledStore, Store};
use crate::tokenizer::CounterOptions;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Which store backend to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory,
    Sled { path: PathBuf },
    Redis { url: String },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sled { path: PathBuf::from("./termindex-data") }
    }
}

impl StoreConfig {
    /// Parses the short form used on the command line: `memory`,
    /// `sled:<path>` or a `redis://` / `rediss://` URL.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec == "memory" {
            Ok(StoreConfig::Memory)
        } else if let Some(path) = spec.strip_prefix("sled:") {
            if path.is_empty() {
                return Err(Error::InvalidStoreSpec(spec.to_string()));
            }
            Ok(StoreConfig::Sled { path: PathBuf::from(path) })
        } else if spec.starts_with("redis://") || spec.starts_with("rediss://") {
            Ok(StoreConfig::Redis { url: spec.to_string() })
        } else {
            Err(Error::InvalidStoreSpec(spec.to_string()))
        }
    }

    pub fn open(&self) -> Result<Box<dyn Store>> {
        match self {
            StoreConfig::Memory => Ok(Box::new(MemoryStore::new())),
            StoreConfig::Sled { path } => Ok(Box::new(SledStore::open(path)?)),
            #[cfg(feature = "redis")]
            StoreConfig::Redis { url } => Ok(Box::new(crate::store::RedisStore::open(url)?)),
            #[cfg(not(feature = "redis"))]
            StoreConfig::Redis { .. } => Err(Error::BackendUnavailable("redis")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub store: StoreConfig,
    pub counter: CounterOptions,
}

impl IndexConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut f = File::open(path)?;
        let mut buf = String::new();
        f.read_to_string(&mut buf)?;
        let config: IndexConfig = serde_json::from_str(&buf)?;
        Ok(config)
    }
}
