//! Route guards. These are a UX boundary only: the backend re-authorizes every
//! request, so a guard decides what to render, never what a user may access.

use super::machine::{Session, SessionStatus};
use crate::routes::{Access, Route};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still loading; render a placeholder and decide later.
    Suspend,
    Render,
    Redirect(Route),
}

/// Landing page for the current session.
#[must_use]
pub fn home_for(session: &Session) -> Route {
    match session.status() {
        SessionStatus::Loading | SessionStatus::Anonymous => Route::SignIn,
        SessionStatus::AuthenticatedPending => Route::CompleteProfile,
        SessionStatus::AuthenticatedAdmin => Route::AdminHome,
        SessionStatus::AuthenticatedCitizen => {
            if session.is_admin() {
                Route::AdminHome
            } else {
                Route::Home
            }
        }
    }
}

/// Guard for pages that need a signed-in user, optionally with `required_role`.
/// Admins asking for a citizen-only page go to their home, and role-gated pages
/// wait for a resolved profile.
#[must_use]
pub fn restricted(session: &Session, required_role: Option<&str>) -> GuardDecision {
    if session.is_loading() {
        return GuardDecision::Suspend;
    }
    if !session.is_authenticated() {
        return GuardDecision::Redirect(Route::SignIn);
    }
    let pending = session.status() == SessionStatus::AuthenticatedPending;
    match required_role {
        Some(_) if pending => GuardDecision::Redirect(home_for(session)),
        Some(role) if !session.has_role(role) => GuardDecision::Redirect(home_for(session)),
        None if session.is_admin() => GuardDecision::Redirect(home_for(session)),
        _ => GuardDecision::Render,
    }
}

/// Guard for pages meant for signed-out visitors.
#[must_use]
pub fn unrestricted(session: &Session) -> GuardDecision {
    if session.is_loading() {
        GuardDecision::Suspend
    } else if session.is_authenticated() {
        GuardDecision::Redirect(home_for(session))
    } else {
        GuardDecision::Render
    }
}

#[must_use]
pub fn evaluate(session: &Session, route: Route) -> GuardDecision {
    let decision = match route.access() {
        Access::Public => GuardDecision::Render,
        Access::Unrestricted => unrestricted(session),
        Access::Restricted(role) => restricted(session, role),
    };
    // A redirect to the page being rendered is a render.
    match decision {
        GuardDecision::Redirect(target) if target == route => GuardDecision::Render,
        decision => decision,
    }
}
