use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::controller::DEFAULT_FALLBACK_MESSAGE;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5001";
pub const ENDPOINT_ENV_VAR: &str = "CHAT_WIDGET_ENDPOINT";

const DEFAULT_SHORTCUTS: [&str; 4] = [
    "/help",
    "Son haberleri ara",
    "Gelen kutumu özetle",
    "Gider raporu hazırla",
];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub endpoint: Option<String>,
    pub shortcuts: Option<Vec<String>>,
    pub fallback_message: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the default location, or defaults if there is no file yet
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Backend base URL: environment variable first, then the file, then the default
    pub fn endpoint(&self) -> String {
        std::env::var(ENDPOINT_ENV_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Like [`Config::endpoint`], with a command-line value taking precedence
    pub fn resolve_endpoint(&self, flag: Option<String>) -> String {
        flag.filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.endpoint())
    }

    pub fn shortcuts(&self) -> Vec<String> {
        self.shortcuts
            .clone()
            .unwrap_or_else(|| DEFAULT_SHORTCUTS.iter().map(|s| s.to_string()).collect())
    }

    pub fn fallback_message(&self) -> String {
        self.fallback_message
            .clone()
            .unwrap_or_else(|| DEFAULT_FALLBACK_MESSAGE.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("chat-widget"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
