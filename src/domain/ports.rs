use crate::domain::model::Organization;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// 選取組織持久化使用的固定鍵
pub const SELECTED_ORG_KEY: &str = "techvault_selected_org";

/// 可跨行程重啟保存的 key-value 儲存
pub trait SelectionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// 目前使用者可存取的組織目錄
#[async_trait]
pub trait OrganizationDirectory: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Organization>>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn api_token(&self) -> Option<&str>;
    fn request_timeout(&self) -> Duration;
    fn store_path(&self) -> &str;
}

/// 依組織分區的 REST 資源，例如 `/locations/`
pub trait ScopedResource: DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    const LABEL: &'static str;
}
