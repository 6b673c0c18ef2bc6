use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Environment variable overriding the configured API URL
pub const API_URL_ENV: &str = "TICKTOCK_API_URL";

const DEFAULT_CATALOG_MAX_AGE_HOURS: i64 = 24;

fn default_catalog_max_age() -> i64 {
    DEFAULT_CATALOG_MAX_AGE_HOURS
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the timesheet API; unset means the built-in demo backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default = "default_catalog_max_age")]
    pub catalog_max_age_hours: i64,
    /// Log file name under the data directory; unset logs to stdout only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: None,
            catalog_max_age_hours: DEFAULT_CATALOG_MAX_AGE_HOURS,
            log_file: None,
        }
    }
}

impl Config {
    pub fn get_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "ticktock", "ticktock")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::LoadFailed(format!(
                "config file {} does not exist",
                path.display()
            ))
            .into());
        }

        let config_data = fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&config_data)
            .map_err(|e| ConfigError::LoadFailed(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Stored config if present, defaults otherwise, then environment overrides
    pub fn load_or_default() -> Result<Self> {
        let config = match Self::get_config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => {
                debug!("no config file, using defaults");
                Config::default()
            }
        };
        config.with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => self.with_api_url(url),
            _ => Ok(self),
        }
    }

    pub fn with_api_url(mut self, url: String) -> Result<Self> {
        self.api_url = Some(url.trim().to_string());
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if let Some(url) = &self.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidApiUrl(url.clone()));
            }
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("failed to create config directory: {}", e))
            })?;
        }

        let config_data = serde_json::to_string_pretty(self)?;

        fs::write(path, config_data)
            .map_err(|e| ConfigError::SaveFailed(format!("failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimesheetError;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, None);
        assert_eq!(config.catalog_max_age_hours, 24);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ticktock").join("config.json");

        let config = Config {
            api_url: Some("http://localhost:3000".to_string()),
            catalog_max_age_hours: 6,
            log_file: Some("ticktock.log".to_string()),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_from(&dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, TimesheetError::Config(ConfigError::LoadFailed(_))));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = Config::default()
            .with_api_url("localhost:3000".to_string())
            .unwrap_err();
        assert!(matches!(err, TimesheetError::Config(ConfigError::InvalidApiUrl(_))));

        let config = Config::default()
            .with_api_url(" https://timesheets.example.com ".to_string())
            .unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://timesheets.example.com"));
    }
}
