//! Client configuration for API endpoints and credential lifetimes with runtime
//! overrides. Compiled defaults come from build-time environment variables and
//! are replaced by `VOZCIDADA_*` variables present when the process starts, so a
//! single binary can target different backends. Configuration values are public;
//! do not store secrets here.

use std::{env, time::Duration};
use tracing::warn;

/// Default access token lifetime (1 hour).
pub const DEFAULT_ACCESS_TTL_SECONDS: u64 = 60 * 60;
/// Default refresh token lifetime (24 hours).
pub const DEFAULT_REFRESH_TTL_SECONDS: u64 = 60 * 60 * 24;
/// Default lifetime of the OAuth-origin marker (1 hour).
pub const DEFAULT_OAUTH_MARKER_TTL_SECONDS: u64 = 60 * 60;
/// Default request timeout applied to every HTTP client.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;
/// Default notification polling period.
pub const DEFAULT_NOTIFICATION_POLL_SECONDS: u64 = 30;

const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const DEFAULT_POSTAL_URL: &str = "https://viacep.com.br/ws";

/// Client configuration derived from build-time environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub userinfo_url: String,
    pub postal_url: String,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub oauth_marker_ttl_seconds: u64,
    pub http_timeout_seconds: u64,
    pub notification_poll_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: option_env!("VOZCIDADA_API_BASE_URL")
                .unwrap_or("http://localhost:8080")
                .to_string(),
            userinfo_url: option_env!("VOZCIDADA_USERINFO_URL")
                .unwrap_or(DEFAULT_USERINFO_URL)
                .to_string(),
            postal_url: option_env!("VOZCIDADA_POSTAL_URL")
                .unwrap_or(DEFAULT_POSTAL_URL)
                .to_string(),
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
            oauth_marker_ttl_seconds: DEFAULT_OAUTH_MARKER_TTL_SECONDS,
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            notification_poll_seconds: DEFAULT_NOTIFICATION_POLL_SECONDS,
        }
    }
}

impl AppConfig {
    /// Loads compiled defaults and applies runtime environment overrides.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();
        apply_runtime_overrides(&mut config, runtime_config());
        config
    }

    #[must_use]
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_seconds)
    }

    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_seconds)
    }

    #[must_use]
    pub fn oauth_marker_ttl(&self) -> Duration {
        Duration::from_secs(self.oauth_marker_ttl_seconds)
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    #[must_use]
    pub fn notification_poll(&self) -> Duration {
        Duration::from_secs(self.notification_poll_seconds)
    }
}

#[derive(Default)]
struct RuntimeConfig {
    api_base_url: Option<String>,
    userinfo_url: Option<String>,
    postal_url: Option<String>,
    access_ttl_seconds: Option<u64>,
    refresh_ttl_seconds: Option<u64>,
    oauth_marker_ttl_seconds: Option<u64>,
    http_timeout_seconds: Option<u64>,
    notification_poll_seconds: Option<u64>,
}

fn apply_runtime_overrides(config: &mut AppConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = runtime.userinfo_url {
        config.userinfo_url = value;
    }
    if let Some(value) = runtime.postal_url {
        config.postal_url = value;
    }
    if let Some(value) = runtime.access_ttl_seconds {
        config.access_ttl_seconds = value;
    }
    if let Some(value) = runtime.refresh_ttl_seconds {
        config.refresh_ttl_seconds = value;
    }
    if let Some(value) = runtime.oauth_marker_ttl_seconds {
        config.oauth_marker_ttl_seconds = value;
    }
    if let Some(value) = runtime.http_timeout_seconds {
        config.http_timeout_seconds = value;
    }
    if let Some(value) = runtime.notification_poll_seconds {
        config.notification_poll_seconds = value;
    }
}

fn runtime_config() -> RuntimeConfig {
    RuntimeConfig {
        api_base_url: read_runtime_value("VOZCIDADA_API_BASE_URL"),
        userinfo_url: read_runtime_value("VOZCIDADA_USERINFO_URL"),
        postal_url: read_runtime_value("VOZCIDADA_POSTAL_URL"),
        access_ttl_seconds: read_runtime_seconds("VOZCIDADA_ACCESS_TTL"),
        refresh_ttl_seconds: read_runtime_seconds("VOZCIDADA_REFRESH_TTL"),
        oauth_marker_ttl_seconds: read_runtime_seconds("VOZCIDADA_OAUTH_MARKER_TTL"),
        http_timeout_seconds: read_runtime_seconds("VOZCIDADA_HTTP_TIMEOUT"),
        notification_poll_seconds: read_runtime_seconds("VOZCIDADA_NOTIFICATION_POLL"),
    }
}

fn read_runtime_value(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    normalize_runtime_value(&value)
}

fn read_runtime_seconds(key: &str) -> Option<u64> {
    let value = read_runtime_value(key)?;
    match value.parse::<u64>() {
        Ok(seconds) if seconds > 0 => Some(seconds),
        _ => {
            warn!("Ignoring {key}: expected a positive number of seconds");
            None
        }
    }
}

fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
