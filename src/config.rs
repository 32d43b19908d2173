use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::FlowMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_health_url")]
    pub health_url: String,

    #[serde(default = "default_single_endpoint_url")]
    pub single_endpoint_url: String,

    #[serde(default)]
    pub flow: FlowMode,

    /// Pause after reaching 100% before the result view is shown.
    #[serde(default = "default_completion_delay_ms")]
    pub completion_delay_ms: u64,

    #[serde(default = "default_health_check")]
    pub health_check: bool,

    #[serde(default = "default_download_dir")]
    pub download_dir: String,
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_health_url() -> String {
    "http://localhost:5000/health".to_string()
}

fn default_single_endpoint_url() -> String {
    "http://127.0.0.1:8000/generate_video/".to_string()
}

fn default_completion_delay_ms() -> u64 {
    1000
}

fn default_health_check() -> bool {
    true
}

fn default_download_dir() -> String {
    dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            health_url: default_health_url(),
            single_endpoint_url: default_single_endpoint_url(),
            flow: FlowMode::default(),
            completion_delay_ms: default_completion_delay_ms(),
            health_check: default_health_check(),
            download_dir: default_download_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("api_base_url", &self.api_base_url),
            ("health_url", &self.health_url),
            ("single_endpoint_url", &self.single_endpoint_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| AppError::Config(format!("{key} is not a valid URL ({value}): {e}")))?;
        }
        Ok(())
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("videogen-client")
            .join("config.toml")
    }
}
