use thiserror::Error;

#[derive(Error, Debug)]
pub enum TechVaultError {
    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("{resource} '{id}' not found")]
    NotFound { resource: String, id: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Could not load organizations: {message}")]
    DirectoryLoadError { message: String },

    #[error("Selection store error: {message}")]
    StoreError { message: String },

    /// 在 `SessionScope` 掛載前存取組織上下文，屬於程式接線錯誤
    #[error("organization context accessed outside an active session scope")]
    ContextNotInitialized,

    #[error("Not authenticated")]
    NotAuthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
    Storage,
    Configuration,
    Programmer,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TechVaultError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TechVaultError::HttpError(_) | TechVaultError::DirectoryLoadError { .. } => {
                ErrorCategory::Network
            }
            TechVaultError::ApiError { .. }
            | TechVaultError::NotFound { .. }
            | TechVaultError::NotAuthenticated => ErrorCategory::Api,
            TechVaultError::IoError(_) | TechVaultError::StoreError { .. } => {
                ErrorCategory::Storage
            }
            TechVaultError::UrlError(_)
            | TechVaultError::ConfigValidationError { .. }
            | TechVaultError::InvalidConfigValueError { .. }
            | TechVaultError::MissingConfigError { .. } => ErrorCategory::Configuration,
            TechVaultError::ContextNotInitialized => ErrorCategory::Programmer,
            TechVaultError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Api => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Programmer => ErrorSeverity::Critical,
        }
    }

    /// 只有上下文未初始化算是程式錯誤，其餘皆為可恢復的執行期錯誤
    pub fn is_programmer_error(&self) -> bool {
        matches!(self, TechVaultError::ContextNotInitialized)
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TechVaultError::HttpError(e) if e.is_timeout() => {
                "The TechVault server did not respond in time".to_string()
            }
            TechVaultError::HttpError(_) => "Could not reach the TechVault server".to_string(),
            TechVaultError::ApiError { status: 401, .. }
            | TechVaultError::ApiError { status: 403, .. }
            | TechVaultError::NotAuthenticated => {
                "You are not allowed to access this resource".to_string()
            }
            TechVaultError::NotFound { resource, id } => {
                format!("{} '{}' does not exist or is no longer accessible", resource, id)
            }
            TechVaultError::ContextNotInitialized => {
                "Internal error: no organization session is active".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the api.base_url setting and your network connection",
            ErrorCategory::Api => "Verify your API token and that the organization still exists",
            ErrorCategory::Storage => "Check that the selection store path is writable",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::Programmer => "Mount a SessionScope before using organization views",
            ErrorCategory::Data => "The server response had an unexpected shape; check API versions",
        }
    }
}

pub type Result<T> = std::result::Result<T, TechVaultError>;
