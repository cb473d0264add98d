use anyhow::Result;
use clap::ValueEnum;
use config::{Config, Environment, File as ConfigFile};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/aggregator.toml";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_FORMAT: &str = "pretty";
const ENV_PREFIX: &str = "AGGREGATOR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Memory,
    Sled,
}

impl StoreKind {
    fn from_config(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "memory" => StoreKind::Memory,
            "sled" => StoreKind::Sled,
            other => {
                warn!(store = other, "Unknown store backend, falling back to sled");
                StoreKind::Sled
            }
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            StoreKind::Memory => "memory",
            StoreKind::Sled => "sled",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Storage
    pub store: StoreKind,
    pub data_dir: PathBuf,

    // Logging
    pub log_level: String,
    pub log_format: String,
}

impl AppConfig {
    /// Layer an optional TOML file under `AGGREGATOR_*` environment variables.
    pub fn load(config_path_override: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_path_override, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(
        config_path_override: Option<&Path>,
        environment: Environment,
    ) -> Result<Self> {
        let resolved_path = match config_path_override {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!(
                        "Configuration file {} not found (specified via --config)",
                        path.display()
                    );
                }
                Some(path.to_path_buf())
            }
            None => Some(PathBuf::from(DEFAULT_CONFIG_PATH)).filter(|path| path.exists()),
        };

        let mut builder = Config::builder();
        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }
        builder = builder.add_source(environment);

        let config = builder.build()?;
        Ok(Self::from_config(&config))
    }

    fn from_config(config: &Config) -> Self {
        let store = get_string_value(config, &["STORE", "store", "storage.store"])
            .map(|value| StoreKind::from_config(&value))
            .unwrap_or(StoreKind::Sled);

        let data_dir = get_string_value(config, &["DATA_DIR", "data_dir", "storage.data_dir"])
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let log_level = get_string_value(config, &["LOG_LEVEL", "log_level", "logging.level"])
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_format = get_string_value(config, &["LOG_FORMAT", "log_format", "logging.format"])
            .unwrap_or_else(|| DEFAULT_LOG_FORMAT.to_string());

        Self {
            store,
            data_dir,
            log_level,
            log_format,
        }
    }
}

fn get_string_value(config: &Config, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        config
            .get_string(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
