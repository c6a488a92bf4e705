//! Request and response types for auth-related API calls. Payloads that carry
//! passwords or tokens redact them in `Debug` and must never be logged.

use super::store::CredentialPair;
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub login: String,
    pub password: String,
    pub role: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("login", &self.login)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OAuthExchangeRequest {
    pub email: String,
}

/// Credential pair as returned by every token-issuing endpoint.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenResponse> for CredentialPair {
    fn from(response: TokenResponse) -> Self {
        CredentialPair::new(response.access_token, response.refresh_token)
    }
}

/// Userinfo payload from the identity provider. Only `email` is required.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProviderUserInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Citizen profile as stored by the backend. Read-only on the client.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CitizenProfile {
    pub id: i64,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub data_nascimento: String,
    #[serde(default)]
    pub data_cadastro: String,
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub rua: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub uf: String,
}

/// Administrative staff profile.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: i64,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub cargo: String,
    #[serde(default)]
    pub secretaria: String,
}

/// Fields supplied by the user to create a citizen profile.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CitizenProfileInput {
    pub nome: String,
    pub cpf: String,
    pub data_nascimento: String,
    pub cep: String,
    pub rua: String,
    pub bairro: String,
    pub cidade: String,
    pub uf: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_cadastro: Option<String>,
}

impl CitizenProfileInput {
    /// Names of required fields left blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("nome", &self.nome),
            ("cpf", &self.cpf),
            ("dataNascimento", &self.data_nascimento),
            ("cep", &self.cep),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Native account creation: credentials plus the citizen profile.
#[derive(Clone)]
pub struct SignUpRequest {
    pub login: String,
    pub password: String,
    pub profile: CitizenProfileInput,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("login", &self.login)
            .field("password", &"***")
            .field("profile", &self.profile)
            .finish()
    }
}
