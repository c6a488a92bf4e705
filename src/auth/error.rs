use crate::client::AppError;
use thiserror::Error;

/// Access token could not be interpreted. Always means "re-authenticate".
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid token format")]
    Format,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("missing claim: {0}")]
    MissingClaim(&'static str),
    #[error("unexpected token type: {0}")]
    WrongTokenType(String),
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// No profile exists yet for the subject.
    #[error("profile not found")]
    NotFound,
    #[error("profile service unavailable: {0}")]
    Unavailable(AppError),
}

impl From<AppError> for ResolveError {
    fn from(err: AppError) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Unavailable(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(AppError),
    #[error("identity exchange failed: {0}")]
    ExchangeFailed(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("credential store lock poisoned")]
    Poisoned,
}

/// Failure of a session operation, already classified for the UI.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("sign-in failed: {0}")]
    SignIn(AppError),
    #[error("sign-up failed: {0}")]
    SignUp(AppError),
    #[error(transparent)]
    OAuth(#[from] OAuthError),
    #[error("invalid access token: {0}")]
    Decode(#[from] DecodeError),
    #[error("profile service unavailable")]
    Unavailable,
    #[error("profile provisioning failed: {0}")]
    Provisioning(String),
    #[error("operation not allowed while {0}")]
    InvalidState(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A newer session operation (or sign-out) started before this one finished;
    /// its result was discarded.
    #[error("superseded by a newer session change")]
    Superseded,
}

impl AuthError {
    /// Single user-facing message for a non-blocking notice.
    #[must_use]
    pub fn notice(&self) -> &'static str {
        match self {
            Self::SignIn(_) => "Sign-in failed. Check your credentials and try again.",
            Self::SignUp(_) => "Sign-up failed. Check your details and try again.",
            Self::OAuth(_) => "Google sign-in failed. Please try again.",
            Self::Decode(_) | Self::Unavailable | Self::Store(_) => {
                "Your session could not be restored. Please sign in again."
            }
            Self::Provisioning(_) => "Your profile could not be saved. Please try again.",
            Self::InvalidState(_) => "This action is not available right now.",
            Self::Superseded => "",
        }
    }

    /// Whether the error should be shown to the user at all.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::Superseded)
    }
}
