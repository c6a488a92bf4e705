//! HTTP helpers for JSON APIs with consistent timeouts and error handling. Feature
//! clients use these helpers to avoid duplicating request setup and to enforce a
//! predictable timeout policy. Backend calls attach the stored access token as a
//! bearer credential at request time; the helpers never log token material.

use super::{config::AppConfig, errors::AppError};
use crate::{APP_USER_AGENT, auth::store::CredentialStore};
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use std::{sync::Arc, time::Duration};
use url::Url;

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

/// Builds the shared reqwest client with the configured timeout and user agent.
///
/// # Errors
/// Returns `AppError::Config` if the TLS backend cannot be initialized.
pub fn http_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|err| AppError::Config(format!("Failed to initialize HTTP client: {err}")))
}

/// Backend client. Cloning is cheap; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("credentials", &"***")
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client for `config.api_base_url` that reads bearer tokens from
    /// `credentials`.
    ///
    /// # Errors
    /// Returns an error when the base URL is blank, is not an absolute http(s)
    /// URL, or the HTTP client cannot be built.
    pub fn new(config: &AppConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self, AppError> {
        let base_url = config.api_base_url.trim();
        if base_url.is_empty() {
            return Err(AppError::Config("API base URL is not configured.".to_string()));
        }
        let parsed = Url::parse(base_url)
            .map_err(|err| AppError::Config(format!("Invalid API base URL: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "API base URL must use http or https, got {}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            http: http_client(config.http_timeout())?,
            base_url: base_url.to_string(),
            credentials,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches JSON from a backend path.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = send(self.request(Method::GET, path)).await?;
        handle_json_response(response).await
    }

    /// Posts JSON and parses a JSON response.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let response = send(self.request(Method::POST, path).json(body)).await?;
        handle_json_response(response).await
    }

    /// Posts JSON and expects an empty (or ignored) response body.
    pub async fn post_json_empty<B: Serialize>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let response = send(self.request(Method::POST, path).json(body)).await?;
        handle_empty_response(response).await
    }

    /// Replaces a resource with a JSON body and parses the server's copy.
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let response = send(self.request(Method::PUT, path).json(body)).await?;
        handle_json_response(response).await
    }

    /// Sends a body-less PATCH and parses a JSON response.
    pub async fn patch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = send(self.request(Method::PATCH, path)).await?;
        handle_json_response(response).await
    }

    /// Sends a body-less PATCH and expects an empty response body.
    pub async fn patch_empty(&self, path: &str) -> Result<(), AppError> {
        let response = send(self.request(Method::PATCH, path)).await?;
        handle_empty_response(response).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = build_url_with_base(&self.base_url, path);
        let builder = self.http.request(method, url);

        match self.credentials.get() {
            Some(pair) => builder.bearer_auth(pair.access_token.expose_secret()),
            None => builder,
        }
    }
}

/// Fetches JSON from an absolute URL, optionally with a bearer token. Used for
/// third-party endpoints outside the backend base URL.
pub async fn get_json_from<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    bearer: Option<&SecretString>,
) -> Result<T, AppError> {
    let mut builder = http.get(url);
    if let Some(token) = bearer {
        builder = builder.bearer_auth(token.expose_secret());
    }
    let response = send(builder).await?;
    handle_json_response(response).await
}

/// Builds a URL from an explicit base URL and the provided path.
pub(crate) fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Appends `segment` to `path` as one percent-encoded path segment, so
/// identifiers taken from tokens cannot change the request path or add a query.
///
/// # Errors
/// Returns `AppError::Config` if `path` cannot be used as a URL path.
pub(crate) fn path_with_segment(path: &str, segment: &str) -> Result<String, AppError> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|err| AppError::Config(format!("Failed to build request path: {err}")))?;
    url.set_path(path);
    url.path_segments_mut()
        .map_err(|()| AppError::Config(format!("Invalid request path: {path}")))?
        .pop_if_empty()
        .push(segment);
    Ok(url.path().to_string())
}

/// Maps network errors into `AppError` variants with timeout detection.
fn map_request_error(err: &reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        AppError::Serialization(format!("Failed to build request: {err}"))
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn send(builder: RequestBuilder) -> Result<Response, AppError> {
    builder.send().await.map_err(|err| map_request_error(&err))
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

/// Handles empty responses and returns sanitized HTTP errors when needed.
async fn handle_empty_response(response: Response) -> Result<(), AppError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> AppError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    AppError::Http {
        status,
        message: sanitize_body(&body),
    }
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{CredentialPair, MemoryCredentialStore};
    use serde_json::{Value, json};
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, store: Arc<MemoryCredentialStore>) -> ApiClient {
        let config = AppConfig {
            api_base_url: server.uri(),
            ..AppConfig::default()
        };
        ApiClient::new(&config, store).unwrap()
    }

    #[test]
    fn build_url_with_base_joins_slashes() {
        assert_eq!(
            build_url_with_base("https://api.test/", "/auth/login"),
            "https://api.test/auth/login"
        );
        assert_eq!(build_url_with_base("  ", "/auth/login"), "/auth/login");
    }

    #[test]
    fn path_with_segment_escapes_reserved_characters() {
        assert_eq!(
            path_with_segment("/api/usuario/auth", "42").unwrap(),
            "/api/usuario/auth/42"
        );
        assert_eq!(
            path_with_segment("/api/usuario/auth/", "a/b?c#d").unwrap(),
            "/api/usuario/auth/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn sanitize_body_truncates_and_defaults() {
        assert_eq!(sanitize_body("   "), "Request failed.");
        let long = "x".repeat(500);
        assert_eq!(sanitize_body(&long).len(), MAX_ERROR_CHARS);
    }

    #[test]
    fn new_rejects_blank_base_url() {
        let config = AppConfig {
            api_base_url: "   ".to_string(),
            ..AppConfig::default()
        };
        let result = ApiClient::new(&config, Arc::new(MemoryCredentialStore::new()));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn new_rejects_relative_and_non_http_base_urls() {
        for base in ["/api", "ftp://files.test"] {
            let config = AppConfig {
                api_base_url: base.to_string(),
                ..AppConfig::default()
            };
            let result = ApiClient::new(&config, Arc::new(MemoryCredentialStore::new()));
            assert!(matches!(result, Err(AppError::Config(_))), "{base}");
        }
    }

    #[tokio::test]
    async fn attaches_bearer_from_store() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .and(header("Authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new());
        store
            .set(
                &CredentialPair::new("access-1", "refresh-1"),
                Duration::from_secs(60),
                Duration::from_secs(120),
            )
            .unwrap();

        let client = client_for(&server, store);
        let body: Value = client.get_json("/api/ping").await.unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn omits_bearer_without_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        let body: Value = client.get_json("/api/ping").await.unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn surfaces_http_errors_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/notificacoes/lidas"))
            .respond_with(ResponseTemplate::new(503).set_body_string("  maintenance  "))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        let err = client.patch_empty("/api/notificacoes/lidas").await.unwrap_err();
        match err {
            AppError::Http { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn reports_undecodable_bodies_as_parse_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        let result: Result<Value, AppError> = client.get_json("/api/ping").await;
        assert!(matches!(result, Err(AppError::Parse(_))));
    }
}
