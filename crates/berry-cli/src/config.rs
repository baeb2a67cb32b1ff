//! Configuration file management.

use std::path::PathBuf;

use berry_oracle::freshness::{Freshness, DEFAULT_MAX_AGE};
use berry_oracle::metered::ReadCost;
use serde::{Deserialize, Serialize};

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BerryConfig {
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Lookup settings.
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Advanced settings.
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
}

/// Lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Maximum age of a record returned by `data-before`. 0 = no limit.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
    /// Cost charged per `count` read.
    #[serde(default = "default_read_cost")]
    pub read_cost_count: u64,
    /// Cost charged per timestamp read.
    #[serde(default = "default_read_cost")]
    pub read_cost_timestamp: u64,
    /// Cost charged per value read.
    #[serde(default = "default_read_cost")]
    pub read_cost_value: u64,
}

/// Advanced configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions

fn default_max_age() -> u64 {
    DEFAULT_MAX_AGE
}

fn default_read_cost() -> u64 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age(),
            read_cost_count: default_read_cost(),
            read_cost_timestamp: default_read_cost(),
            read_cost_value: default_read_cost(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl OracleConfig {
    pub fn freshness(&self) -> Freshness {
        Freshness::new(self.max_age_secs)
    }

    pub fn read_cost(&self) -> ReadCost {
        ReadCost {
            count: self.read_cost_count,
            timestamp: self.read_cost_timestamp,
            value: self.read_cost_value,
        }
    }
}

impl BerryConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: BerryConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// Default data directory, overridable with `BERRY_DATA_DIR`.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("BERRY_DATA_DIR") {
            return PathBuf::from(dir);
        }
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".berry"))
            .unwrap_or_else(|_| PathBuf::from("/tmp/berry"))
    }
}
