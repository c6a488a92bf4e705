//! Access token claims decoding. The decoder only parses the JWT payload for
//! routing and UI decisions; it never verifies signatures. The backend re-checks
//! every request, so nothing here is an authorization boundary.

use super::error::DecodeError;
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Administrative role marker.
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";
/// Role assigned to self-registered citizens.
pub const CITIZEN_ROLE: &str = "ROLE_USER";

const ROLE_PREFIX: &str = "ROLE_";
const ACCESS_TOKEN_TYPE: &str = "ACCESS";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthStatus {
    /// Local profile exists; the account is fully provisioned.
    #[default]
    Native,
    /// Identity provider handshake succeeded but no local profile exists yet.
    SigninPending,
}

/// Normalized role set. Every entry carries the `ROLE_` prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roles(BTreeSet<String>);

impl Roles {
    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(&normalize_role(role))
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0.contains(ADMIN_ROLE)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Roles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|role| normalize_role(role.as_ref()))
                .filter(|role| role.len() > ROLE_PREFIX.len())
                .collect(),
        )
    }
}

fn normalize_role(role: &str) -> String {
    let role = role.trim();
    if role.starts_with(ROLE_PREFIX) {
        role.to_string()
    } else {
        format!("{ROLE_PREFIX}{role}")
    }
}

/// Structured view of an access token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claims {
    pub subject_id: String,
    pub issuer: String,
    pub token_type: String,
    pub auth_status: AuthStatus,
    pub roles: Roles,
    /// Expiry as unix seconds.
    pub expires_at: i64,
}

impl Claims {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.is_admin()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.auth_status == AuthStatus::SigninPending
    }

    #[must_use]
    pub fn is_expired(&self, now_unix_seconds: i64) -> bool {
        self.expires_at <= now_unix_seconds
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
}

/// The backend emits a single role string; other issuers use arrays.
#[derive(Deserialize)]
#[serde(untagged)]
enum RoleClaim {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct RawClaims {
    sub: Option<String>,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default, alias = "authStatus")]
    auth_status: Option<AuthStatus>,
    roles: Option<RoleClaim>,
    exp: Option<i64>,
}

fn b64d_json<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, DecodeError> {
    let bytes = Base64UrlUnpadded::decode_vec(segment.trim_end_matches('='))
        .map_err(|_| DecodeError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Decode an access token into claims without verifying its signature.
///
/// # Errors
///
/// Returns an error if:
/// - the token is not three dot-separated segments or contains invalid base64/json,
/// - the header declares no algorithm or `none`,
/// - `sub`, `roles` or `exp` are missing (an empty role list counts as missing),
/// - `token_type` is present and is not `ACCESS`.
pub fn decode(access_token: &str) -> Result<Claims, DecodeError> {
    let mut parts = access_token.trim().split('.');
    let header_b64 = parts.next().ok_or(DecodeError::Format)?;
    let claims_b64 = parts.next().ok_or(DecodeError::Format)?;
    let _signature = parts.next().ok_or(DecodeError::Format)?;
    if parts.next().is_some() || header_b64.is_empty() || claims_b64.is_empty() {
        return Err(DecodeError::Format);
    }

    let header: RawHeader = b64d_json(header_b64)?;
    match header.alg.as_deref().map(str::trim) {
        None | Some("") => return Err(DecodeError::UnsupportedAlgorithm("missing".to_string())),
        Some(alg) if alg.eq_ignore_ascii_case("none") => {
            return Err(DecodeError::UnsupportedAlgorithm(alg.to_string()));
        }
        Some(_) => {}
    }

    let raw: RawClaims = b64d_json(claims_b64)?;

    let subject_id = raw
        .sub
        .filter(|sub| !sub.trim().is_empty())
        .ok_or(DecodeError::MissingClaim("sub"))?;

    let roles: Roles = match raw.roles {
        Some(RoleClaim::One(role)) => std::iter::once(role).collect(),
        Some(RoleClaim::Many(roles)) => roles.into_iter().collect(),
        None => Roles::default(),
    };
    if roles.is_empty() {
        return Err(DecodeError::MissingClaim("roles"));
    }

    let expires_at = raw.exp.ok_or(DecodeError::MissingClaim("exp"))?;

    let token_type = raw
        .token_type
        .unwrap_or_else(|| ACCESS_TOKEN_TYPE.to_string());
    if token_type != ACCESS_TOKEN_TYPE {
        return Err(DecodeError::WrongTokenType(token_type));
    }

    Ok(Claims {
        subject_id,
        issuer: raw.iss.unwrap_or_default(),
        token_type,
        auth_status: raw.auth_status.unwrap_or_default(),
        roles,
        expires_at,
    })
}
