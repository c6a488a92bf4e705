//! Application route table and navigation sink.
//!
//! Every page declares its access requirement here; the guards in
//! [`crate::auth::guards`] turn a requirement plus the current session into a
//! render/redirect decision. Navigation requests emitted by the session state
//! machine go through a [`Navigator`] so front ends decide how to act on them.

use crate::auth::claims::ADMIN_ROLE;
use std::{fmt, sync::Mutex};
use tracing::info;

pub mod paths {
    pub const SIGN_IN: &str = "/signin";
    pub const SIGN_UP: &str = "/signup";
    pub const RESET_PASSWORD: &str = "/reset-password";
    pub const HOME: &str = "/home";
    pub const ADMIN_HOME: &str = "/admin/home";
    pub const COMPLETE_PROFILE: &str = "/complete-profile";
    pub const CHAMADOS: &str = "/chamados";
    pub const ABOUT: &str = "/about";
    pub const CONTACT: &str = "/contact";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    SignUp,
    ResetPassword,
    Home,
    AdminHome,
    CompleteProfile,
    Chamados,
    About,
    Contact,
}

/// Access requirement declared by a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// No guard at all.
    Public,
    /// Only for signed-out visitors (sign-in, sign-up).
    Unrestricted,
    /// Signed-in users, optionally holding a specific role.
    Restricted(Option<&'static str>),
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::SignIn,
        Route::SignUp,
        Route::ResetPassword,
        Route::Home,
        Route::AdminHome,
        Route::CompleteProfile,
        Route::Chamados,
        Route::About,
        Route::Contact,
    ];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Route::SignIn => paths::SIGN_IN,
            Route::SignUp => paths::SIGN_UP,
            Route::ResetPassword => paths::RESET_PASSWORD,
            Route::Home => paths::HOME,
            Route::AdminHome => paths::ADMIN_HOME,
            Route::CompleteProfile => paths::COMPLETE_PROFILE,
            Route::Chamados => paths::CHAMADOS,
            Route::About => paths::ABOUT,
            Route::Contact => paths::CONTACT,
        }
    }

    #[must_use]
    pub const fn access(self) -> Access {
        match self {
            Route::SignIn | Route::SignUp | Route::ResetPassword => Access::Unrestricted,
            Route::Home | Route::Chamados | Route::CompleteProfile => Access::Restricted(None),
            Route::AdminHome => Access::Restricted(Some(ADMIN_ROLE)),
            Route::About | Route::Contact => Access::Public,
        }
    }

    /// Resolves a request path. `/` and unknown paths land on the citizen home.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim().trim_end_matches('/');
        Route::ALL
            .into_iter()
            .find(|route| route.path() == trimmed)
            .unwrap_or(Route::Home)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Receives navigation requests from the session state machine.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Records every navigation and logs it. Suitable for headless front ends
/// such as the CLI.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.history
            .lock()
            .ok()
            .and_then(|history| history.last().copied())
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: Route) {
        info!("navigate to {route}");
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), route);
        }
    }

    #[test]
    fn unknown_paths_fall_back_to_home() {
        assert_eq!(Route::from_path("/"), Route::Home);
        assert_eq!(Route::from_path("/nowhere"), Route::Home);
        assert_eq!(Route::from_path("/admin/home/"), Route::AdminHome);
        assert_eq!(Route::from_path("/signin?next=/home"), Route::SignIn);
    }

    #[test]
    fn admin_home_requires_admin_role() {
        assert_eq!(Route::AdminHome.access(), Access::Restricted(Some(ADMIN_ROLE)));
        assert_eq!(Route::SignIn.access(), Access::Unrestricted);
        assert_eq!(Route::About.access(), Access::Public);
    }

    #[test]
    fn history_navigator_records_in_order() {
        let navigator = HistoryNavigator::new();
        assert_eq!(navigator.current(), None);
        navigator.navigate(Route::Home);
        navigator.navigate(Route::SignIn);
        assert_eq!(navigator.history(), vec![Route::Home, Route::SignIn]);
        assert_eq!(navigator.current(), Some(Route::SignIn));
    }
}
