//! Client wrappers for the backend auth and profile endpoints. The trait keeps
//! the session core independent of HTTP so it can be driven by test doubles;
//! `ApiClient` is the production implementation. Request bodies carry passwords
//! and responses carry tokens, so neither is ever logged.

use super::{
    store::CredentialPair,
    types::{
        CitizenProfile, CitizenProfileInput, LoginRequest, OAuthExchangeRequest, RegisterRequest,
        TokenResponse,
    },
};
use crate::client::{ApiClient, AppError};
use std::future::Future;
use tracing::instrument;

/// Backend operations the session core depends on.
pub trait AuthApi: Send + Sync + 'static {
    /// `POST /auth/login`
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<CredentialPair, AppError>> + Send;

    /// `POST /auth/register`
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// `POST /auth/oauth/google`: trades a provider-verified email for local credentials.
    fn exchange_oauth(
        &self,
        request: &OAuthExchangeRequest,
    ) -> impl Future<Output = Result<CredentialPair, AppError>> + Send;

    /// `PATCH /auth/updateAuthStatus`: upgrades `SIGNIN_PENDING` to `NATIVE`.
    fn upgrade_auth_status(&self)
    -> impl Future<Output = Result<CredentialPair, AppError>> + Send;

    /// `POST /api/usuario`
    fn create_citizen(
        &self,
        profile: &CitizenProfileInput,
    ) -> impl Future<Output = Result<CitizenProfile, AppError>> + Send;

    /// `PUT /api/usuario`
    fn update_citizen(
        &self,
        profile: &CitizenProfile,
    ) -> impl Future<Output = Result<CitizenProfile, AppError>> + Send;
}

impl AuthApi for ApiClient {
    #[instrument(skip_all, fields(login = %request.login))]
    async fn login(&self, request: &LoginRequest) -> Result<CredentialPair, AppError> {
        let response: TokenResponse = self.post_json("/auth/login", request).await?;
        Ok(response.into())
    }

    #[instrument(skip_all, fields(login = %request.login, role = %request.role))]
    async fn register(&self, request: &RegisterRequest) -> Result<(), AppError> {
        self.post_json_empty("/auth/register", request).await
    }

    #[instrument(skip_all)]
    async fn exchange_oauth(
        &self,
        request: &OAuthExchangeRequest,
    ) -> Result<CredentialPair, AppError> {
        let response: TokenResponse = self.post_json("/auth/oauth/google", request).await?;
        Ok(response.into())
    }

    #[instrument(skip_all)]
    async fn upgrade_auth_status(&self) -> Result<CredentialPair, AppError> {
        let response: TokenResponse = self.patch_json("/auth/updateAuthStatus").await?;
        Ok(response.into())
    }

    #[instrument(skip_all)]
    async fn create_citizen(
        &self,
        profile: &CitizenProfileInput,
    ) -> Result<CitizenProfile, AppError> {
        self.post_json("/api/usuario", profile).await
    }

    #[instrument(skip_all, fields(id = profile.id))]
    async fn update_citizen(&self, profile: &CitizenProfile) -> Result<CitizenProfile, AppError> {
        self.put_json("/api/usuario", profile).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{CredentialStore, MemoryCredentialStore};
    use crate::client::AppConfig;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use std::{sync::Arc, time::Duration};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, store: Arc<MemoryCredentialStore>) -> ApiClient {
        let config = AppConfig {
            api_base_url: server.uri(),
            ..AppConfig::default()
        };
        ApiClient::new(&config, store).unwrap()
    }

    fn tokens() -> serde_json::Value {
        json!({ "accessToken": "access-1", "refreshToken": "refresh-1" })
    }

    #[tokio::test]
    async fn login_posts_credentials_and_returns_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "login": "maria@example.com", "password": "secret" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(tokens()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        let pair = client
            .login(&LoginRequest {
                login: "maria@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(pair.access_token.expose_secret(), "access-1");
        assert_eq!(pair.refresh_token.expose_secret(), "refresh-1");
    }

    #[tokio::test]
    async fn login_rejection_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        let err = client
            .login(&LoginRequest {
                login: "maria@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn upgrade_uses_current_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/auth/updateAuthStatus"))
            .and(header("Authorization", "Bearer pending-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tokens()))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new());
        store
            .set(
                &CredentialPair::new("pending-access", "pending-refresh"),
                Duration::from_secs(60),
                Duration::from_secs(60),
            )
            .unwrap();

        let client = client_for(&server, store);
        let pair = client.upgrade_auth_status().await.unwrap();
        assert_eq!(pair.access_token.expose_secret(), "access-1");
    }

    #[tokio::test]
    async fn register_sends_role() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .and(body_json(json!({
                "login": "maria@example.com",
                "password": "secret",
                "role": "USER"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        client
            .register(&RegisterRequest {
                login: "maria@example.com".to_string(),
                password: "secret".to_string(),
                role: "USER".to_string(),
            })
            .await
            .unwrap();
    }
}
