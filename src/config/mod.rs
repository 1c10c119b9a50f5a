//! Configuration management for sermon-review
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the review service
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout for ordinary requests in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for slide analysis requests in seconds
    #[serde(default = "default_analysis_timeout_secs")]
    pub analysis_timeout_secs: u64,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Reviewer name, used as the presenter when uploading
    #[serde(default)]
    pub reviewer: Option<String>,

    /// Where regenerated presentations are written
    #[serde(default = "default_download_dir")]
    pub download_dir: String,

    /// Path the configuration was loaded from (not serialized)
    #[serde(skip)]
    pub config_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            analysis_timeout_secs: default_analysis_timeout_secs(),
            user_agent: default_user_agent(),
            reviewer: None,
            download_dir: default_download_dir(),
            config_file: Self::default_config_path(),
        }
    }
}

impl Config {
    /// Get the default base directory (~/.sermon-review)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sermon-review")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.config_file = config_path.to_path_buf();

        config.validate()?;
        Ok(config)
    }

    /// Load configuration if the file exists, otherwise use defaults
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);

        if path.exists() {
            Self::load(&path)
        } else {
            debug!("No config file at {:?}, using defaults", path);
            let config = Config {
                config_file: path,
                ..Config::default()
            };
            config.validate()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.config_file, content)?;
        info!("Saved config to {:?}", self.config_file);
        Ok(())
    }

    /// Parsed service base URL
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.api_base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(format!(
                "api_base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }

        if self.analysis_timeout_secs == 0 {
            return Err(Error::Config(
                "analysis_timeout_secs must be positive".to_string(),
            ));
        }

        if self.download_dir.trim().is_empty() {
            return Err(Error::Config("download_dir must not be empty".to_string()));
        }

        Ok(())
    }
}
