pub mod context;
pub mod guard;
pub mod notifications;
pub mod profile;
pub mod session;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Status(GlobalArgs),
    Login(session::LoginArgs),
    SignUp(session::SignUpArgs),
    OAuth(session::OAuthArgs),
    CompleteProfile(profile::Args),
    UpdateProfile(profile::Args),
    Logout(GlobalArgs),
    Guard(guard::Args),
    Notifications(notifications::Args),
}

impl Action {
    // Convenience wrapper so call sites can do `action.execute().await`.
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
