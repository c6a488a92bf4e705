//! Session and authorization core: credential persistence, token decoding,
//! profile resolution, the OAuth bridge, the session state machine and the
//! route guards that consume it.

pub mod claims;
pub mod client;
pub mod error;
pub mod guards;
pub mod machine;
pub mod oauth;
pub mod resolver;
pub mod state;
pub mod store;
pub mod types;

pub use client::AuthApi;
pub use error::{AuthError, DecodeError, OAuthError, ResolveError, StoreError};
pub use guards::GuardDecision;
pub use machine::{Identity, Session, SessionOrigin, SessionStatus, Step};
pub use oauth::{GoogleIdentityProvider, IdentityProvider, OAuthBridge};
pub use resolver::IdentityResolver;
pub use state::AuthContext;
pub use store::{CredentialPair, CredentialStore, FileCredentialStore, MemoryCredentialStore};
