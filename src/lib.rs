pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::http::{ApiClient, AuthApi, OrganizationApi};
pub use adapters::storage::{FileSelectionStore, MemorySelectionStore};
pub use config::Settings;
pub use crate::core::{
    ContextPhase, OrganizationContext, OrganizationViews, SessionScope, SELECTED_ORG_KEY,
};
pub use domain::model::Organization;
pub use utils::error::{Result, TechVaultError};
