//! Configuration for the service point orchestrator.
//!
//! YAML file, one section per collaborator. Every section has defaults so a
//! partial file (or none at all) is usable for local development.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable holding the config file path.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("shard count must be at least 1, got {0}")]
    InvalidShardCount(u32),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub queue_engine: QueueEngineConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// `CONFIG_PATH` if set, defaults otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.shard_count == 0 {
            return Err(ConfigError::InvalidShardCount(0));
        }
        if self.storage.backend == StorageBackend::File
            && self.storage.data_dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid("storage.data_dir is empty".into()));
        }
        if self.queue_engine.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("queue_engine.base_url is empty".into()));
        }
        if self.queue_engine.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "queue_engine.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.stream.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("stream.path is empty".into()));
        }
        Ok(())
    }
}

/// Where partition segments live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One `shard_{n}.json` per partition under `data_dir`.
    #[default]
    File,
    /// Process memory only; lost on restart.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Number of partitions (N). Changing it remaps nearly every id.
    #[serde(default = "default_shard_count")]
    pub shard_count: u32,
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            shard_count: default_shard_count(),
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_shard_count() -> u32 {
    4
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/service-points")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEngineConfig {
    #[serde(default = "default_engine_url")]
    pub base_url: String,
    #[serde(default = "default_engine_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl QueueEngineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for QueueEngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_engine_url(),
            request_timeout_ms: default_engine_timeout_ms(),
        }
    }
}

fn default_engine_url() -> String {
    "http://127.0.0.1:8081".to_string()
}

fn default_engine_timeout_ms() -> u64 {
    3_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Append-only JSON-lines file receiving ticket completion events.
    #[serde(default = "default_stream_path")]
    pub path: PathBuf,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            path: default_stream_path(),
        }
    }
}

fn default_stream_path() -> PathBuf {
    PathBuf::from("./data/completed-tickets.jsonl")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Per-request deadline. 0 disables the deadline.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
