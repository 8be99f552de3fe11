//! Configuration management with validation and defaults
//!
//! Sources are applied in order: built-in defaults, an optional TOML file,
//! `DICE_*` environment variables, then command line flags in `main`.

use crate::errors::{ConfigurationError, FairDiceResult};
use serde::{Deserialize, Serialize};
use std::{env, path::Path, time::Duration};

pub const ENV_PREFIX: &str = "DICE_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level service configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
    pub game: GameConfig,
}

/// HTTP listener settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    /// `*` allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 2342,
            request_timeout_secs: 5,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl HttpConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Outcome storage backend
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Rocksdb,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "rocksdb" => Ok(StorageBackend::Rocksdb),
            _ => Err(ConfigurationError::InvalidValue {
                field: "storage.backend".to_string(),
                value: s.to_string(),
                reason: "Expected 'memory' or 'rocksdb'".to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Rocksdb,
            data_dir: "./DB/fairdice".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Game rules that depend on deployment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Registers the commit-reveal generator when set
    pub enable_verification: bool,
    /// Pinned house seed; generated at startup when absent
    pub house_seed: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            enable_verification: true,
            house_seed: None,
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> FairDiceResult<AppConfig> {
        self.load_with_env(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an explicit variable lookup
    pub fn load_with_env<F>(&self, lookup: F) -> FairDiceResult<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.config_path {
            Some(ref path) => Self::load_from_file(path)?,
            None => AppConfig::default(),
        };

        apply_env_overrides(&mut config, lookup)?;
        validate(&config)?;

        Ok(config)
    }

    fn load_from_file(path: &str) -> FairDiceResult<AppConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into()
        })
    }

    /// Save configuration to file
    pub fn save(config: &AppConfig, path: &str) -> FairDiceResult<()> {
        let toml_string = toml::to_string_pretty(config).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, toml_string).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to write to {}: {}", path, e)).into()
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String, reason: &str) -> Result<T, ConfigurationError> {
    value.parse().map_err(|_| ConfigurationError::InvalidValue {
        field: key.to_string(),
        value,
        reason: reason.to_string(),
    })
}

/// Apply `DICE_*` overrides
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

    // HTTP overrides
    if let Some(host) = var("HTTP_HOST") {
        config.http.host = host;
    }
    if let Some(port) = var("HTTP_PORT") {
        config.http.port = parse_env("DICE_HTTP_PORT", port, "Invalid port number")?;
    }

    // Log overrides
    if let Some(level) = var("LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(json) = var("LOG_JSON") {
        config.log.json = parse_env("DICE_LOG_JSON", json, "Invalid boolean value")?;
    }

    // Storage overrides
    if let Some(backend) = var("STORAGE_BACKEND") {
        config.storage.backend = backend.parse()?;
    }
    if let Some(data_dir) = var("STORAGE_DATA_DIR") {
        config.storage.data_dir = data_dir;
    }

    // Game overrides
    if let Some(enabled) = var("GAME_ENABLE_VERIFICATION") {
        config.game.enable_verification =
            parse_env("DICE_GAME_ENABLE_VERIFICATION", enabled, "Invalid boolean value")?;
    }
    if let Some(seed) = var("GAME_HOUSE_SEED") {
        config.game.house_seed = Some(seed);
    }

    Ok(())
}

/// Validate configuration values
pub fn validate(config: &AppConfig) -> Result<(), ConfigurationError> {
    if config.http.port == 0 {
        return Err(ConfigurationError::InvalidValue {
            field: "http.port".to_string(),
            value: "0".to_string(),
            reason: "Port cannot be zero".to_string(),
        });
    }

    if config.http.request_timeout_secs < 1 {
        return Err(ConfigurationError::InvalidValue {
            field: "http.request_timeout_secs".to_string(),
            value: config.http.request_timeout_secs.to_string(),
            reason: "Timeout must be at least 1s".to_string(),
        });
    }

    if config.storage.backend == StorageBackend::Rocksdb && config.storage.data_dir.is_empty() {
        return Err(ConfigurationError::MissingRequired("storage.data_dir".to_string()));
    }

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        return Err(ConfigurationError::InvalidValue {
            field: "log.level".to_string(),
            value: config.log.level.clone(),
            reason: format!("Expected one of {}", LOG_LEVELS.join(", ")),
        });
    }

    // ':' separates disclosure fields.
    if let Some(seed) = &config.game.house_seed {
        if seed.is_empty() || seed.contains(':') {
            return Err(ConfigurationError::InvalidValue {
                field: "game.house_seed".to_string(),
                value: seed.clone(),
                reason: "House seed must be non-empty and must not contain ':'".to_string(),
            });
        }
    }

    Ok(())
}
