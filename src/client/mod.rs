//! Shared client utilities for API access, configuration, errors, and the
//! postal-code boundary.
//!
//! Centralizing these helpers keeps network behavior consistent and avoids
//! duplicated logic in the auth and notification features. The helpers attach
//! credentials but never log them; callers must still avoid logging responses
//! that carry tokens.

pub mod api;
pub mod config;
pub mod errors;
pub mod postal;

pub use api::{ApiClient, http_client};
pub use config::AppConfig;
pub use errors::AppError;
pub use postal::{PostalAddress, PostalLookup};
