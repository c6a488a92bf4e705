//! # Voz Cidadã (session and authorization client)
//!
//! `vozcidada` is the client-side session core of the Voz Cidadã municipal issue
//! tracker. It turns bearer tokens issued by the backend into a single, typed
//! session state and decides which pages a user may see.
//!
//! ## Session lifecycle
//!
//! 1. **Bootstrap:** the credential store is read, the access token is decoded and,
//!    for fully provisioned accounts, the citizen or staff profile is resolved.
//! 2. **Sign-in:** native (`/auth/login`) or Google OAuth (`/auth/oauth/google`)
//!    sign-in persists a fresh credential pair and runs the same branching.
//! 3. **Provisioning:** OAuth accounts without a local profile stay in the
//!    `SIGNIN_PENDING` state until the profile is completed and the backend
//!    upgrades the token to `NATIVE`.
//! 4. **Sign-out:** credentials are cleared and any in-flight work is discarded
//!    on arrival.
//!
//! ## Authorization
//!
//! Decoded claims drive routing only. The backend re-checks every request, so the
//! guards in [`auth::guards`] are a UX boundary, not a security one. Token material
//! is held in `secrecy` wrappers and must never be logged.

pub mod auth;
pub mod cli;
pub mod client;
pub mod notifications;
pub mod routes;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
