//! Backend notification endpoints.

use super::types::Notification;
use crate::client::{ApiClient, AppError};
use std::future::Future;
use tracing::instrument;

pub trait NotificationSource: Send + Sync + 'static {
    /// `GET /api/notificacoes`
    fn list(&self) -> impl Future<Output = Result<Vec<Notification>, AppError>> + Send;

    /// `PATCH /api/notificacoes/{id}/lida`
    fn mark_read(&self, id: i64) -> impl Future<Output = Result<(), AppError>> + Send;

    /// `PATCH /api/notificacoes/lidas`
    fn mark_all_read(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

impl NotificationSource for ApiClient {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Notification>, AppError> {
        self.get_json("/api/notificacoes").await
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: i64) -> Result<(), AppError> {
        self.patch_empty(&format!("/api/notificacoes/{id}/lida"))
            .await
    }

    #[instrument(skip(self))]
    async fn mark_all_read(&self) -> Result<(), AppError> {
        self.patch_empty("/api/notificacoes/lidas").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{CredentialPair, CredentialStore, MemoryCredentialStore};
    use crate::client::AppConfig;
    use serde_json::json;
    use std::{sync::Arc, time::Duration};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let store = MemoryCredentialStore::new();
        store
            .set(
                &CredentialPair::new("access-1", "refresh-1"),
                Duration::from_secs(60),
                Duration::from_secs(60),
            )
            .unwrap();
        let config = AppConfig {
            api_base_url: server.uri(),
            ..AppConfig::default()
        };
        ApiClient::new(&config, Arc::new(store)).unwrap()
    }

    #[tokio::test]
    async fn lists_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notificacoes"))
            .and(header("Authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "title": "a", "message": "m", "timestamp": "2024-05-01T10:00:00", "read": false }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let items = client_for(&server).list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "a");
    }

    #[tokio::test]
    async fn marks_read_by_id_and_all() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/notificacoes/7/lida"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/notificacoes/lidas"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.mark_read(7).await.unwrap();
        client.mark_all_read().await.unwrap();
    }

    #[tokio::test]
    async fn server_errors_surface_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notificacoes"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).list().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }
}
