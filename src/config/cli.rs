use crate::config::toml_config::TomlConfig;
use crate::config::Settings;
use crate::utils::error::{Result, TechVaultError};
use crate::utils::validation::{validate_record_id, Validate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "techvault.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "techvault")]
#[command(about = "Browse TechVault organizations and their documentation from the terminal")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults to ./techvault.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override api.base_url
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override api.token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Override storage.path
    #[arg(long, global = true)]
    pub store_path: Option<String>,

    /// Override api.timeout_seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List organizations, marking the selected one
    Orgs,
    /// Select an organization by id
    Select { id: String },
    /// Clear the selected organization
    Clear,
    /// Show the selected organization
    Current,
    /// Show record counts for the selected organization
    Stats,
    /// List records of the selected organization
    List {
        #[arg(value_enum)]
        resource: ResourceKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Locations,
    Contacts,
    Documentations,
    Passwords,
    Configurations,
    NetworkDevices,
    EndpointUsers,
    Servers,
    Peripherals,
}

impl CliConfig {
    /// 載入設定檔（若有）並套用命令列覆蓋
    pub fn resolve_settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                if !Path::new(path).exists() {
                    return Err(TechVaultError::MissingConfigError {
                        field: format!("config file {}", path),
                    });
                }
                Settings::from(&Self::load_toml(path)?)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Settings::from(&Self::load_toml(DEFAULT_CONFIG_FILE)?)
            }
            None => Settings::default(),
        };

        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(token) = &self.token {
            settings.token = Some(token.clone());
        }
        if let Some(store_path) = &self.store_path {
            settings.store_path = store_path.clone();
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_seconds = timeout;
        }

        Ok(settings)
    }

    fn load_toml(path: &str) -> Result<TomlConfig> {
        tracing::debug!("Loading configuration from {}", path);
        let config = TomlConfig::from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Command::Select { id } = &self.command {
            validate_record_id("id", id)?;
        }
        Ok(())
    }
}
