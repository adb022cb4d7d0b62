//! Store settings.
//!
//! Loaded from an optional TOML file with `PREF_`-prefixed environment
//! variables taking priority, or constructed directly with
//! [`StoreSettings::default`].

use std::path::PathBuf;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Tuning for the persistent sled-backed engine
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreSettings {
    /// Filesystem root of the database
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Page cache size in bytes
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity_bytes: u64,

    /// Background flush interval; `None` flushes only on demand
    #[serde(default = "default_flush_every_ms")]
    pub flush_every_ms: Option<u64>,

    #[serde(default = "default_use_compression")]
    pub use_compression: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_path(),
            cache_capacity_bytes: default_cache_capacity(),
            flush_every_ms: default_flush_every_ms(),
            use_compression: default_use_compression(),
        }
    }
}

impl StoreSettings {
    /// Load settings from an optional TOML file, then environment
    /// variables (highest priority).
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("PREF"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("pref_data")
}

fn default_cache_capacity() -> u64 {
    10 * 1024 * 1024 //10MB
}

fn default_flush_every_ms() -> Option<u64> {
    Some(3)
}

fn default_use_compression() -> bool {
    true
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = StoreSettings::default();
        assert_eq!(settings.path, PathBuf::from("pref_data"));
        assert_eq!(settings.cache_capacity_bytes, 10 * 1024 * 1024);
        assert_eq!(settings.flush_every_ms, Some(3));
        assert!(settings.use_compression);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let settings = StoreSettings::load(None).unwrap();
        assert_eq!(settings.cache_capacity_bytes, 10 * 1024 * 1024);
    }
}
