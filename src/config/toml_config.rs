use crate::utils::error::{Result, TechVaultError};
use crate::utils::validation::{validate_api_url, validate_range, validate_store_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: ApiConfig,
    pub storage: Option<StorageConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TechVaultError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TECHVAULT_TOKEN})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TechVaultError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_api_url("api.base_url", &self.api.base_url)?;

        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 300)?;
        }

        if let Some(storage) = &self.storage {
            validate_store_path("storage.path", &storage.path)?;
        }

        if let Some(level) = self.logging.as_ref().and_then(|l| l.level.as_deref()) {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(TechVaultError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }

    /// 仍含有 `${...}` 的 token 視為未設定
    pub fn token(&self) -> Option<&str> {
        match self.api.token.as_deref() {
            Some(token) if token.trim().is_empty() => None,
            Some(token) if token.contains("${") => {
                tracing::warn!("api.token references an unset environment variable");
                None
            }
            other => other,
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[api]
base_url = "https://vault.example.com/api"
timeout_seconds = 10
token = "abc"

[storage]
path = "/var/lib/techvault/selection.json"

[logging]
level = "debug"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.base_url, "https://vault.example.com/api");
        assert_eq!(config.api.timeout_seconds, Some(10));
        assert_eq!(config.token(), Some("abc"));
        assert_eq!(
            config.storage.unwrap().path,
            "/var/lib/techvault/selection.json"
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TECHVAULT_TEST_BASE_URL", "https://test.vault.local/api");

        let toml_content = r#"
[api]
base_url = "${TECHVAULT_TEST_BASE_URL}"
token = "${TECHVAULT_TEST_UNSET_TOKEN}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.base_url, "https://test.vault.local/api");
        assert_eq!(config.token(), None);

        std::env::remove_var("TECHVAULT_TEST_BASE_URL");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = TomlConfig::from_toml_str("[api]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_timeout = TomlConfig::from_toml_str(
            "[api]\nbase_url = \"http://localhost:8000/api\"\ntimeout_seconds = 0\n",
        )
        .unwrap();
        assert!(bad_timeout.validate().is_err());

        let bad_level = TomlConfig::from_toml_str(
            "[api]\nbase_url = \"http://localhost:8000/api\"\n[logging]\nlevel = \"loud\"\n",
        )
        .unwrap();
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_missing_api_section_is_rejected() {
        let err = TomlConfig::from_toml_str("[storage]\npath = \"x.json\"\n").unwrap_err();
        assert!(matches!(err, TechVaultError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[api]\nbase_url = \"http://localhost:8000/api\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.storage.is_none());
    }
}
