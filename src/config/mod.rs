#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_api_url, validate_range, validate_store_path, Validate};
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// 合併設定檔與命令列後的最終設定
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: u64,
    pub store_path: String,
    pub log_level: Option<String>,
}

/// `$HOME/.techvault/selection.json`，沒有 HOME 時使用目前目錄
pub fn default_store_path() -> String {
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(".techvault")
        .join("selection.json")
        .to_string_lossy()
        .into_owned()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            store_path: default_store_path(),
            log_level: None,
        }
    }
}

impl From<&TomlConfig> for Settings {
    fn from(config: &TomlConfig) -> Self {
        let defaults = Settings::default();
        Self {
            base_url: config.api.base_url.clone(),
            token: config.token().map(str::to_string),
            timeout_seconds: config
                .api
                .timeout_seconds
                .unwrap_or(defaults.timeout_seconds),
            store_path: config
                .storage
                .as_ref()
                .map(|s| s.path.clone())
                .unwrap_or(defaults.store_path),
            log_level: config.logging.as_ref().and_then(|l| l.level.clone()),
        }
    }
}

impl ConfigProvider for Settings {
    fn api_base_url(&self) -> &str {
        &self.base_url
    }

    fn api_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn store_path(&self) -> &str {
        &self.store_path
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_api_url("api.base_url", &self.base_url)?;
        validate_range("api.timeout_seconds", self.timeout_seconds, 1, 300)?;
        validate_store_path("storage.path", &self.store_path)?;
        Ok(())
    }
}
