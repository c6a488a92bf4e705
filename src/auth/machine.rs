//! Pure session transitions. `step` maps the current session and one event to
//! the next session, at most one navigation target, and at most one side effect
//! for the driver in [`super::state`] to perform. Nothing here touches the
//! network, the credential store, or the clock.

use super::{
    claims::{Claims, Roles},
    error::ResolveError,
    resolver::ResolveTarget,
    types::{AdminProfile, CitizenProfile},
};
use crate::routes::Route;
use std::fmt;

/// How the current credentials were obtained. Decides which completion flow a
/// front end renders; the transitions ignore it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionOrigin {
    #[default]
    Native,
    OAuth,
}

/// Decoded credentials backing a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub claims: Claims,
    pub origin: SessionOrigin,
}

/// The authoritative in-memory session. Each variant carries exactly the data
/// valid in that state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Session {
    /// Startup (`identity: None`, store not read yet) or a profile resolution in flight.
    Loading { identity: Option<Identity> },
    Anonymous,
    /// Identity verified, local profile missing.
    AuthenticatedPending { identity: Identity },
    AuthenticatedCitizen {
        identity: Identity,
        profile: CitizenProfile,
    },
    AuthenticatedAdmin {
        identity: Identity,
        profile: AdminProfile,
    },
}

impl Default for Session {
    fn default() -> Self {
        Session::Loading { identity: None }
    }
}

/// Fieldless summary of a [`Session`], for logging and display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Anonymous,
    AuthenticatedPending,
    AuthenticatedCitizen,
    AuthenticatedAdmin,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::Loading => "loading",
            SessionStatus::Anonymous => "anonymous",
            SessionStatus::AuthenticatedPending => "authenticated (profile pending)",
            SessionStatus::AuthenticatedCitizen => "authenticated citizen",
            SessionStatus::AuthenticatedAdmin => "authenticated admin",
        };
        f.write_str(label)
    }
}

impl Session {
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match self {
            Session::Loading { .. } => SessionStatus::Loading,
            Session::Anonymous => SessionStatus::Anonymous,
            Session::AuthenticatedPending { .. } => SessionStatus::AuthenticatedPending,
            Session::AuthenticatedCitizen { .. } => SessionStatus::AuthenticatedCitizen,
            Session::AuthenticatedAdmin { .. } => SessionStatus::AuthenticatedAdmin,
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Loading { identity } => identity.as_ref(),
            Session::Anonymous => None,
            Session::AuthenticatedPending { identity }
            | Session::AuthenticatedCitizen { identity, .. }
            | Session::AuthenticatedAdmin { identity, .. } => Some(identity),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Session::Loading { .. })
    }

    /// Roles are known, even if the profile is not. A pending OAuth session is
    /// authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    #[must_use]
    pub fn roles(&self) -> Option<&Roles> {
        self.identity().map(|identity| &identity.claims.roles)
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles().is_some_and(|roles| roles.contains(role))
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles().is_some_and(Roles::is_admin)
    }

    #[must_use]
    pub fn origin(&self) -> Option<SessionOrigin> {
        self.identity().map(|identity| identity.origin)
    }

    #[must_use]
    pub fn citizen(&self) -> Option<&CitizenProfile> {
        match self {
            Session::AuthenticatedCitizen { profile, .. } => Some(profile),
            _ => None,
        }
    }

    #[must_use]
    pub fn admin(&self) -> Option<&AdminProfile> {
        match self {
            Session::AuthenticatedAdmin { profile, .. } => Some(profile),
            _ => None,
        }
    }
}

/// Resolver failure stripped of its transport detail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveFailure {
    NotFound,
    Unavailable,
}

impl From<&ResolveError> for ResolveFailure {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::NotFound => ResolveFailure::NotFound,
            ResolveError::Unavailable(_) => ResolveFailure::Unavailable,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Store empty or partially expired.
    NoCredentials,
    /// Stored token malformed or expired.
    DecodeFailed,
    Decoded(Identity),
    CitizenResolved(CitizenProfile),
    AdminResolved(AdminProfile),
    ResolveFailed(ResolveFailure),
    ProfileUpdated(CitizenProfile),
    SignedOut,
}

/// Work the driver must perform after committing a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Resolve(ResolveTarget),
    ClearCredentials,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub session: Session,
    pub redirect: Option<Route>,
    pub effect: Option<Effect>,
}

impl Step {
    fn to(session: Session) -> Self {
        Self {
            session,
            redirect: None,
            effect: None,
        }
    }

    fn redirect(mut self, route: Route) -> Self {
        self.redirect = Some(route);
        self
    }

    fn effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// A step that leaves `session` untouched.
    #[must_use]
    pub fn unchanged(session: &Session) -> Self {
        Self::to(session.clone())
    }

    fn signed_out() -> Self {
        Self::to(Session::Anonymous)
            .redirect(Route::SignIn)
            .effect(Effect::ClearCredentials)
    }
}

/// Computes the next session for `event`. Events that do not apply to the
/// current session leave it unchanged.
#[must_use]
pub fn step(current: &Session, event: Event) -> Step {
    match event {
        Event::NoCredentials => Step::to(Session::Anonymous),

        Event::DecodeFailed | Event::SignedOut => Step::signed_out(),

        Event::Decoded(identity) => {
            if identity.claims.is_pending() {
                Step::to(Session::AuthenticatedPending { identity }).redirect(Route::CompleteProfile)
            } else {
                let target = ResolveTarget::for_claims(&identity.claims);
                Step::to(Session::Loading {
                    identity: Some(identity),
                })
                .effect(Effect::Resolve(target))
            }
        }

        Event::CitizenResolved(profile) => match current {
            Session::Loading {
                identity: Some(identity),
            } if !identity.claims.is_admin() => Step::to(Session::AuthenticatedCitizen {
                identity: identity.clone(),
                profile,
            })
            .redirect(Route::Home),
            _ => Step::unchanged(current),
        },

        Event::AdminResolved(profile) => match current {
            Session::Loading {
                identity: Some(identity),
            } if identity.claims.is_admin() => Step::to(Session::AuthenticatedAdmin {
                identity: identity.clone(),
                profile,
            })
            .redirect(Route::AdminHome),
            _ => Step::unchanged(current),
        },

        Event::ResolveFailed(failure) => match current {
            Session::Loading {
                identity: Some(identity),
            } => match failure {
                // Staff profiles are provisioned server-side; there is no
                // completion flow for them.
                ResolveFailure::NotFound if !identity.claims.is_admin() => {
                    Step::to(Session::AuthenticatedPending {
                        identity: identity.clone(),
                    })
                    .redirect(Route::CompleteProfile)
                }
                ResolveFailure::NotFound | ResolveFailure::Unavailable => Step::signed_out(),
            },
            _ => Step::unchanged(current),
        },

        Event::ProfileUpdated(profile) => match current {
            Session::AuthenticatedCitizen { identity, .. } => {
                Step::to(Session::AuthenticatedCitizen {
                    identity: identity.clone(),
                    profile,
                })
            }
            _ => Step::unchanged(current),
        },
    }
}
