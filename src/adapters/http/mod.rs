pub mod auth;
pub mod organizations;
pub mod resources;

use crate::domain::model::AuthTokens;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, TechVaultError};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

pub use auth::{AuthApi, AuthSession};
pub use organizations::OrganizationApi;
pub use resources::{
    ConfigurationApi, ContactApi, DocumentationApi, EndpointUserApi, LocationApi,
    NetworkDeviceApi, PasswordApi, PeripheralApi, ResourceApi, ServerApi,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TechVault REST API 的共用 HTTP 客戶端
#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    tokens: RwLock<Option<AuthTokens>>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        // Url::join 會丟掉沒有結尾斜線的最後一段
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&normalized)?,
            tokens: RwLock::new(None),
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let api = Self::with_timeout(config.api_base_url(), config.request_timeout())?;
        if let Some(token) = config.api_token() {
            api.set_tokens(AuthTokens {
                access: token.to_string(),
                refresh: String::new(),
            });
        }
        Ok(api)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn set_tokens(&self, tokens: AuthTokens) {
        if let Ok(mut slot) = self.tokens.write() {
            *slot = Some(tokens);
        }
    }

    pub fn clear_tokens(&self) {
        if let Ok(mut slot) = self.tokens.write() {
            *slot = None;
        }
    }

    pub fn tokens(&self) -> Option<AuthTokens> {
        self.tokens.read().ok().and_then(|slot| slot.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens() {
            Some(tokens) if !tokens.access.is_empty() => request.bearer_auth(tokens.access),
            _ => request,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!("GET {}", url);
        let request = self.client.get(url).query(query);
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("POST {}", url);
        let response = self.execute(self.client.post(url).json(body)).await?;
        Ok(response.json().await?)
    }

    /// 不關心回應內容的 POST（publish、logout 等動作）
    pub async fn post_action(&self, path: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        tracing::debug!("POST {}", url);
        self.execute(self.client.post(url).json(&serde_json::json!({})))
            .await?;
        Ok(())
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("PATCH {}", url);
        let response = self.execute(self.client.patch(url).json(body)).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        tracing::debug!("DELETE {}", url);
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TechVaultError::ApiError {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }
}

/// DRF 的錯誤通常是 `{"detail": "..."}`
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}

/// 把 404 轉成帶資源名稱的 NotFound
pub(crate) fn not_found_as(resource: &str, id: &str) -> impl FnOnce(TechVaultError) -> TechVaultError {
    let resource = resource.to_string();
    let id = id.to_string();
    move |err| match err {
        TechVaultError::ApiError { status: 404, .. } => TechVaultError::NotFound { resource, id },
        other => other,
    }
}
