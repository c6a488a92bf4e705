//! Bridge between the Google identity provider and local accounts.
//!
//! Flow Overview: the provider access token is used once against the userinfo
//! endpoint to obtain a verified email, which the backend trades for a local
//! credential pair. Accounts created this way start as `SIGNIN_PENDING`; once
//! the user supplies the missing profile fields the profile is created and the
//! backend re-issues credentials with `NATIVE` status. The bridge persists
//! nothing, so a failure at any hop leaves no partial state behind.

use super::{
    client::AuthApi,
    error::OAuthError,
    store::CredentialPair,
    types::{CitizenProfile, CitizenProfileInput, OAuthExchangeRequest, ProviderUserInfo},
};
use crate::client::{AppConfig, AppError, api::get_json_from};
use reqwest::Client;
use secrecy::SecretString;
use std::{future::Future, sync::Arc};
use tracing::{debug, instrument};

/// Third-party identity provider userinfo lookup.
pub trait IdentityProvider: Send + Sync + 'static {
    fn user_info(
        &self,
        provider_token: &SecretString,
    ) -> impl Future<Output = Result<ProviderUserInfo, AppError>> + Send;
}

/// Google OAuth2 `userinfo` endpoint.
#[derive(Clone, Debug)]
pub struct GoogleIdentityProvider {
    http: Client,
    userinfo_url: String,
}

impl GoogleIdentityProvider {
    #[must_use]
    pub fn new(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            userinfo_url: config.userinfo_url.trim().to_string(),
        }
    }
}

impl IdentityProvider for GoogleIdentityProvider {
    #[instrument(skip_all)]
    async fn user_info(&self, provider_token: &SecretString) -> Result<ProviderUserInfo, AppError> {
        get_json_from(&self.http, &self.userinfo_url, Some(provider_token)).await
    }
}

/// Result of completing a pending OAuth account.
#[derive(Debug)]
pub struct Provisioned {
    pub profile: CitizenProfile,
    pub credentials: CredentialPair,
}

pub struct OAuthBridge<P, A> {
    provider: P,
    api: Arc<A>,
}

impl<P: IdentityProvider, A: AuthApi> OAuthBridge<P, A> {
    pub fn new(provider: P, api: Arc<A>) -> Self {
        Self { provider, api }
    }

    /// Exchanges a provider access token for a local credential pair.
    ///
    /// # Errors
    /// `ProviderUnavailable` when the userinfo call fails, `ExchangeFailed` when
    /// the payload has no usable email or the backend rejects the exchange.
    #[instrument(skip_all)]
    pub async fn exchange_identity(
        &self,
        provider_token: &SecretString,
    ) -> Result<CredentialPair, OAuthError> {
        let info = self
            .provider
            .user_info(provider_token)
            .await
            .map_err(OAuthError::ProviderUnavailable)?;
        let email = verified_email(info)?;

        debug!("provider identity verified, exchanging with backend");
        self.api
            .exchange_oauth(&OAuthExchangeRequest { email })
            .await
            .map_err(|err| OAuthError::ExchangeFailed(err.to_string()))
    }

    /// Creates the local profile for a pending account, then upgrades its
    /// status and returns the re-issued credentials.
    ///
    /// # Errors
    /// `ExchangeFailed` when either backend call fails or required fields are blank.
    #[instrument(skip_all)]
    pub async fn complete_oauth_provisioning(
        &self,
        input: &CitizenProfileInput,
    ) -> Result<Provisioned, OAuthError> {
        let missing = input.missing_fields();
        if !missing.is_empty() {
            return Err(OAuthError::ExchangeFailed(format!(
                "missing profile fields: {}",
                missing.join(", ")
            )));
        }

        let profile = self
            .api
            .create_citizen(input)
            .await
            .map_err(|err| OAuthError::ExchangeFailed(format!("profile creation: {err}")))?;

        let credentials = self
            .api
            .upgrade_auth_status()
            .await
            .map_err(|err| OAuthError::ExchangeFailed(format!("status upgrade: {err}")))?;

        Ok(Provisioned {
            profile,
            credentials,
        })
    }
}

/// Validates the provider payload at the boundary.
fn verified_email(info: ProviderUserInfo) -> Result<String, OAuthError> {
    if info.email_verified == Some(false) {
        return Err(OAuthError::ExchangeFailed(
            "provider email is not verified".to_string(),
        ));
    }

    info.email
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
        .ok_or_else(|| OAuthError::ExchangeFailed("provider returned no email".to_string()))
}
