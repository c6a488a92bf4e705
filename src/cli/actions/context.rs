//! Wiring shared by every action: configuration, the file credential store,
//! the backend client and the session context built on them.

use crate::{
    auth::{
        AuthContext, AuthError, CredentialStore, FileCredentialStore, GoogleIdentityProvider,
        Session, Step,
    },
    cli::globals::GlobalArgs,
    client::{ApiClient, AppConfig, PostalLookup, http_client},
    routes::HistoryNavigator,
};
use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

pub type SessionContext = AuthContext<ApiClient, ApiClient, GoogleIdentityProvider>;

pub struct Runtime {
    pub config: AppConfig,
    pub api: ApiClient,
    pub session: SessionContext,
    http: Client,
}

impl Runtime {
    /// # Errors
    /// Returns an error if the backend URL is blank or the HTTP client cannot be built.
    pub fn new(globals: &GlobalArgs) -> Result<Self> {
        let config = globals.config();
        let store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(globals.store_path.clone()));

        let api = ApiClient::new(&config, Arc::clone(&store))
            .context("failed to build backend client")?;
        let http = http_client(config.http_timeout()).context("failed to build HTTP client")?;
        let provider = GoogleIdentityProvider::new(http.clone(), &config);

        let session = AuthContext::new(
            Arc::new(api.clone()),
            api.clone(),
            provider,
            store,
            Arc::new(HistoryNavigator::new()),
            &config,
        );

        debug!(
            api = api.base_url(),
            store = %globals.store_path.display(),
            "session runtime ready"
        );

        Ok(Self {
            config,
            api,
            session,
            http,
        })
    }

    #[must_use]
    pub fn postal(&self) -> PostalLookup {
        PostalLookup::new(self.http.clone(), &self.config)
    }
}

/// One-line summary of a session for terminal output.
#[must_use]
pub fn describe(session: &Session) -> String {
    let subject = session
        .identity()
        .map(|identity| identity.claims.subject_id.as_str())
        .unwrap_or_default();

    match session {
        Session::Loading { .. } => "session: loading".to_string(),
        Session::Anonymous => "session: signed out".to_string(),
        Session::AuthenticatedPending { .. } => {
            format!("session: account {subject} awaiting profile completion")
        }
        Session::AuthenticatedCitizen { profile, .. } => {
            format!("session: citizen {} (id {})", profile.nome, profile.id)
        }
        Session::AuthenticatedAdmin { profile, .. } => {
            format!(
                "session: staff {} (id {}, {})",
                profile.nome, profile.id, profile.cargo
            )
        }
    }
}

pub fn report(step: &Step) {
    println!("{}", describe(&step.session));
    if let Some(route) = step.redirect {
        println!("next page: {route}");
    }
}

/// Converts a session failure into the user-facing notice plus its cause.
#[must_use]
pub fn failure(err: &AuthError) -> anyhow::Error {
    if err.is_user_visible() {
        anyhow!("{} ({err})", err.notice())
    } else {
        anyhow!("{err}")
    }
}
