use super::ApiClient;
use crate::domain::model::{AuthTokens, LoginCredentials, RegisterData, User};
use crate::utils::error::{Result, TechVaultError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// dj-rest-auth 依序列化器不同，會回傳 `access`/`refresh` 或 `access_token`/`refresh_token`
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access: Option<String>,
    refresh: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<User>,
}

impl TokenResponse {
    fn into_session(self) -> Result<AuthSession> {
        let access = self
            .access_token
            .or(self.access)
            .ok_or(TechVaultError::NotAuthenticated)?;
        let refresh = self.refresh_token.or(self.refresh).unwrap_or_default();

        Ok(AuthSession {
            user: self.user,
            tokens: AuthTokens { access, refresh },
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: Option<User>,
    pub tokens: AuthTokens,
}

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: Arc<ApiClient>,
}

impl AuthApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession> {
        let response: TokenResponse = self.client.post("auth/login/", credentials).await?;
        let session = response.into_session()?;
        self.client.set_tokens(session.tokens.clone());
        tracing::info!("Logged in as {}", credentials.email);
        Ok(session)
    }

    pub async fn register(&self, data: &RegisterData) -> Result<AuthSession> {
        let response: TokenResponse = self.client.post("auth/registration/", data).await?;
        let session = response.into_session()?;
        self.client.set_tokens(session.tokens.clone());
        Ok(session)
    }

    /// 伺服器端登出失敗只記錄，本地 token 一律清除
    pub async fn logout(&self) {
        if let Err(e) = self.client.post_action("auth/logout/").await {
            tracing::error!("Logout error: {}", e);
        }
        self.client.clear_tokens();
    }

    pub async fn current_user(&self) -> Result<User> {
        if !self.client.is_authenticated() {
            return Err(TechVaultError::NotAuthenticated);
        }
        self.client.get("user/profile/", &[]).await
    }

    pub async fn update_profile<B: Serialize + ?Sized>(&self, patch: &B) -> Result<User> {
        if !self.client.is_authenticated() {
            return Err(TechVaultError::NotAuthenticated);
        }
        self.client.patch("user/profile/", patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn credentials() -> LoginCredentials {
        LoginCredentials {
            email: "admin@example.com".to_string(),
            password: "correct horse".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_accepts_both_token_shapes() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login/");
            then.status(200).json_body(serde_json::json!({
                "access_token": "a1",
                "refresh_token": "r1",
                "user": {"id": 1, "email": "admin@example.com"}
            }));
        });

        let client = Arc::new(ApiClient::new(&server.base_url()).unwrap());
        let session = AuthApi::new(Arc::clone(&client))
            .login(&credentials())
            .await
            .unwrap();
        assert_eq!(session.tokens.access, "a1");
        assert_eq!(session.user.unwrap().id, "1");
        assert_eq!(client.tokens().unwrap().refresh, "r1");

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login/");
            then.status(200)
                .json_body(serde_json::json!({"access": "a2", "refresh": "r2"}));
        });
        let client = Arc::new(ApiClient::new(&server.base_url()).unwrap());
        let session = AuthApi::new(client).login(&credentials()).await.unwrap();
        assert_eq!(session.tokens.access, "a2");
        assert!(session.user.is_none());
    }

    #[tokio::test]
    async fn test_login_without_tokens_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login/");
            then.status(200).json_body(serde_json::json!({"user": null}));
        });

        let client = Arc::new(ApiClient::new(&server.base_url()).unwrap());
        let err = AuthApi::new(Arc::clone(&client))
            .login(&credentials())
            .await
            .unwrap_err();
        assert!(matches!(err, TechVaultError::NotAuthenticated));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_tokens_even_on_server_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/auth/logout/");
            then.status(500);
        });

        let client = Arc::new(ApiClient::new(&server.base_url()).unwrap());
        client.set_tokens(AuthTokens {
            access: "a".to_string(),
            refresh: "r".to_string(),
        });

        AuthApi::new(Arc::clone(&client)).logout().await;
        mock.assert();
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_current_user_requires_token() {
        let server = MockServer::start();
        let profile = server.mock(|when, then| {
            when.method(GET)
                .path("/user/profile/")
                .header("Authorization", "Bearer a");
            then.status(200)
                .json_body(serde_json::json!({"id": 5, "email": "tech@example.com"}));
        });

        let client = Arc::new(ApiClient::new(&server.base_url()).unwrap());
        let auth = AuthApi::new(Arc::clone(&client));
        assert!(matches!(
            auth.current_user().await,
            Err(TechVaultError::NotAuthenticated)
        ));

        client.set_tokens(AuthTokens {
            access: "a".to_string(),
            refresh: String::new(),
        });
        let user = auth.current_user().await.unwrap();
        profile.assert();
        assert_eq!(user.email, "tech@example.com");
    }
}
