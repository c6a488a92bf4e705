//! Postal-code (CEP) lookup used to fill address fields before a citizen profile
//! is created. Thin wrapper over the public ViaCEP API.

use super::{api::get_json_from, config::AppConfig, errors::AppError};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Address fields returned for a CEP.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct PostalAddress {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub logradouro: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub localidade: String,
    #[serde(default)]
    pub uf: String,
}

#[derive(Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(flatten)]
    address: PostalAddress,
}

#[derive(Clone, Debug)]
pub struct PostalLookup {
    http: Client,
    base_url: String,
}

impl PostalLookup {
    #[must_use]
    pub fn new(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            base_url: config.postal_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Looks up a CEP. Returns `Ok(None)` when the CEP is well formed but unknown.
    ///
    /// # Errors
    /// Returns `AppError::Config` for malformed CEPs and transport errors otherwise.
    #[instrument(skip(self))]
    pub async fn lookup(&self, cep: &str) -> Result<Option<PostalAddress>, AppError> {
        let digits = normalize_cep(cep)
            .ok_or_else(|| AppError::Config("CEP must contain exactly 8 digits.".to_string()))?;

        let url = format!("{}/{digits}/json/", self.base_url);
        let response: ViaCepResponse = get_json_from(&self.http, &url, None).await?;

        if response.erro.is_some_and(|flag| flag != serde_json::Value::Bool(false)) {
            debug!("CEP not found");
            return Ok(None);
        }

        Ok(Some(response.address))
    }
}

/// Strips punctuation from a CEP and checks it has eight digits.
#[must_use]
pub fn normalize_cep(cep: &str) -> Option<String> {
    let digits: String = cep.chars().filter(char::is_ascii_digit).collect();
    let stray = cep
        .chars()
        .any(|c| !c.is_ascii_digit() && c != '-' && c != '.' && !c.is_whitespace());
    (digits.len() == 8 && !stray).then_some(digits)
}
