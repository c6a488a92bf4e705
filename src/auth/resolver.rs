//! Profile resolution by subject id. A session resolves exactly one profile
//! kind, chosen from its roles: staff (admin) accounts never fall back to the
//! citizen lookup.

use super::{
    claims::Claims,
    error::ResolveError,
    types::{AdminProfile, CitizenProfile},
};
use crate::client::{ApiClient, api::path_with_segment};
use std::future::Future;
use tracing::instrument;

pub trait IdentityResolver: Send + Sync + 'static {
    /// `GET /api/usuario/auth/{subject_id}`
    fn resolve_citizen(
        &self,
        subject_id: &str,
    ) -> impl Future<Output = Result<CitizenProfile, ResolveError>> + Send;

    /// `GET /api/funcionario/auth/{subject_id}`
    fn resolve_admin(
        &self,
        subject_id: &str,
    ) -> impl Future<Output = Result<AdminProfile, ResolveError>> + Send;
}

/// Which profile lookup a session needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveTarget {
    Citizen { subject_id: String },
    Admin { subject_id: String },
}

impl ResolveTarget {
    /// The admin marker takes precedence over any other role.
    #[must_use]
    pub fn for_claims(claims: &Claims) -> Self {
        let subject_id = claims.subject_id.clone();
        if claims.is_admin() {
            Self::Admin { subject_id }
        } else {
            Self::Citizen { subject_id }
        }
    }

    #[must_use]
    pub fn subject_id(&self) -> &str {
        match self {
            Self::Citizen { subject_id } | Self::Admin { subject_id } => subject_id,
        }
    }
}

impl IdentityResolver for ApiClient {
    #[instrument(skip(self))]
    async fn resolve_citizen(&self, subject_id: &str) -> Result<CitizenProfile, ResolveError> {
        let path = path_with_segment("/api/usuario/auth", subject_id)?;
        Ok(self.get_json(&path).await?)
    }

    #[instrument(skip(self))]
    async fn resolve_admin(&self, subject_id: &str) -> Result<AdminProfile, ResolveError> {
        let path = path_with_segment("/api/funcionario/auth", subject_id)?;
        Ok(self.get_json(&path).await?)
    }
}
