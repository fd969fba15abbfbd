use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "dtx";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default log level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Defaults for `dtx split`
    #[serde(default)]
    pub sharing: SharingConfig,
    /// Defaults for `dtx audit`
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingConfig {
    #[serde(default = "default_total")]
    pub total: usize,
    #[serde(default = "default_threshold")]
    pub threshold: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Number of segments challenged per round (all of them if not set)
    #[serde(default)]
    pub sample_size: Option<usize>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_total() -> usize {
    5
}

fn default_threshold() -> usize {
    3
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            sharing: SharingConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            total: default_total(),
            threshold: default_threshold(),
        }
    }
}

impl AppConfig {
    /// Get the dtx directory path (custom or default ~/.dtx)
    pub fn config_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Load `config.toml` from the dtx directory, falling back to defaults
    /// when the file does not exist
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = Self::config_dir(custom_path)?.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(&config_path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config_toml = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;
        Ok(config)
    }

    /// Write the config as `config.toml` into `dir`
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ConfigError> {
        std::fs::create_dir_all(dir)?;
        let config_path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, toml::to_string_pretty(self)?)?;
        Ok(config_path)
    }

    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        tracing::Level::from_str(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
        assert_eq!(config.sharing.total, 5);
        assert_eq!(config.sharing.threshold, 3);
        assert_eq!(config.audit.sample_size, None);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "log_level = \"debug\"\n\n[sharing]\nthreshold = 2\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
        assert_eq!(config.sharing.total, 5);
        assert_eq!(config.sharing.threshold, 2);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            log_level: "warn".to_string(),
            sharing: SharingConfig {
                total: 7,
                threshold: 4,
            },
            audit: AuditConfig {
                sample_size: Some(10),
            },
        };
        config.save(dir.path()).unwrap();
        assert_eq!(AppConfig::load(Some(dir.path().to_path_buf())).unwrap(), config);
    }

    #[test]
    fn test_invalid_values() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "log_level = 3").unwrap();
        assert!(matches!(
            AppConfig::load(Some(dir.path().to_path_buf())),
            Err(ConfigError::TomlDe(_))
        ));

        let config = AppConfig {
            log_level: "loud".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.log_level(),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
