use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use dietlog_core::nutrition::DEFAULT_BASE_URL;

/// Where a setting got its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl ConfigSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "environment",
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A setting paired with the layer that supplied it.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    fn replace(&mut self, value: T, source: ConfigSource) {
        *self = Self::new(value, source);
    }
}

/// Nutrition lookup service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionConfig {
    /// API key sent with every lookup request
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

impl NutritionConfig {
    /// Returns true if an API key is set
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the persisted keys
    pub data_dir: ConfigValue<PathBuf>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Nutrition lookup configuration
    pub nutrition: NutritionConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    nutrition: Option<NutritionConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut config_file = None;
        let mut nutrition = NutritionConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Relative paths are relative to the config file
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir.replace(resolved, ConfigSource::File);
            }
            if let Some(nutrition_config) = file_config.nutrition {
                nutrition = nutrition_config;
            }
        }

        if let Ok(dir) = std::env::var("DIETLOG_DATA_DIR") {
            data_dir.replace(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(key) = std::env::var("DIETLOG_API_KEY") {
            nutrition.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("DIETLOG_API_URL") {
            nutrition.base_url = url;
        }

        tracing::debug!(
            "Loaded config from {:?}, data_dir {} ({})",
            config_file,
            data_dir.value.display(),
            data_dir.source
        );

        Ok(Self {
            data_dir,
            config_file,
            nutrition,
        })
    }

    /// `dietlog` under the platform config dir, e.g. `~/.config/dietlog`.
    pub fn default_config_dir() -> PathBuf {
        app_dir(dirs::config_dir())
    }

    /// `dietlog` under the platform data dir, e.g. `~/.local/share/dietlog`.
    pub fn default_data_dir() -> PathBuf {
        app_dir(dirs::data_dir())
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join("dietlog")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}
