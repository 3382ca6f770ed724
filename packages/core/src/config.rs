//! Engine Configuration
//!
//! `GraphConfig` selects the storage backend and where it keeps its data.
//! It can be built in code, parsed from TOML, or read from the environment:
//!
//! | Variable                     | Field           | Default   |
//! |------------------------------|-----------------|-----------|
//! | `ISSUEGRAPH_BACKEND`         | `backend`       | `memory`  |
//! | `ISSUEGRAPH_ROOT`            | `root`          | -         |
//! | `ISSUEGRAPH_DB_PATH`         | `db_path`       | -         |
//! | `ISSUEGRAPH_ZIP_PATH`        | `zip_path`      | -         |
//! | `ISSUEGRAPH_BASE_PATH`       | `base_path`     | `.issues` |
//! | `ISSUEGRAPH_SEED_DEFAULTS`   | `seed_defaults` | `true`    |
//!
//! # TOML
//!
//! ```toml
//! backend = "local_disk"
//! root = "/srv/tracker"
//! base_path = ".issues"
//! seed_defaults = true
//! ```

use crate::db::DEFAULT_BASE_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_BACKEND: &str = "ISSUEGRAPH_BACKEND";
pub const ENV_ROOT: &str = "ISSUEGRAPH_ROOT";
pub const ENV_DB_PATH: &str = "ISSUEGRAPH_DB_PATH";
pub const ENV_ZIP_PATH: &str = "ISSUEGRAPH_ZIP_PATH";
pub const ENV_BASE_PATH: &str = "ISSUEGRAPH_BASE_PATH";
pub const ENV_SEED_DEFAULTS: &str = "ISSUEGRAPH_SEED_DEFAULTS";

/// Which `Storage` implementation backs the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    LocalDisk,
    Sqlite,
    Zip,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::LocalDisk => "local_disk",
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Zip => "zip",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(StorageBackend::Memory),
            "local_disk" | "local-disk" | "disk" => Some(StorageBackend::LocalDisk),
            "sqlite" | "libsql" => Some(StorageBackend::Sqlite),
            "zip" => Some(StorageBackend::Zip),
            _ => None,
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

fn default_seed() -> bool {
    true
}

/// Storage and bootstrap settings for a `GraphEngine`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the `local_disk` backend
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Database file for the `sqlite` backend
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Archive file for the `zip` backend
    #[serde(default)]
    pub zip_path: Option<PathBuf>,

    /// Folder inside the storage that holds every document
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Register the default node and link types on open
    #[serde(default = "default_seed")]
    pub seed_defaults: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            root: None,
            db_path: None,
            zip_path: None,
            base_path: default_base_path(),
            seed_defaults: default_seed(),
        }
    }
}

impl GraphConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn local_disk(root: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::LocalDisk,
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn sqlite(db_path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            db_path: Some(db_path.into()),
            ..Self::default()
        }
    }

    pub fn zip(zip_path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::Zip,
            zip_path: Some(zip_path.into()),
            ..Self::default()
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_seed_defaults(mut self, seed_defaults: bool) -> Self {
        self.seed_defaults = seed_defaults;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            origin: "<string>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            origin: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Build from `ISSUEGRAPH_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset variables keep their defaults
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = var(ENV_BACKEND) {
            config.backend =
                StorageBackend::parse(&value).ok_or_else(|| ConfigError::InvalidValue {
                    name: ENV_BACKEND.to_string(),
                    value,
                })?;
        }
        config.root = var(ENV_ROOT).map(PathBuf::from);
        config.db_path = var(ENV_DB_PATH).map(PathBuf::from);
        config.zip_path = var(ENV_ZIP_PATH).map(PathBuf::from);
        if let Some(base_path) = var(ENV_BASE_PATH) {
            config.base_path = base_path;
        }
        if let Some(value) = var(ENV_SEED_DEFAULTS) {
            config.seed_defaults = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: ENV_SEED_DEFAULTS.to_string(),
                        value,
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the selected backend has the path it needs
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing = match self.backend {
            StorageBackend::Memory => false,
            StorageBackend::LocalDisk => self.root.is_none(),
            StorageBackend::Sqlite => self.db_path.is_none(),
            StorageBackend::Zip => self.zip_path.is_none(),
        };
        if missing {
            return Err(ConfigError::MissingPath {
                backend: self.backend,
            });
        }
        Ok(())
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {origin}: {source}")]
    Parse {
        origin: String,
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: String, value: String },

    #[error("the {backend} backend requires a path")]
    MissingPath { backend: StorageBackend },
}

/// Install a `tracing` fmt subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
