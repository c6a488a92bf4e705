use crate::cli::actions::{Action, guard, notifications, profile, session};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Status(globals) => session::status(globals).await,
        Action::Login(args) => session::login(args).await,
        Action::SignUp(args) => session::signup(args).await,
        Action::OAuth(args) => session::oauth(args).await,
        Action::CompleteProfile(args) => profile::complete(args).await,
        Action::UpdateProfile(args) => profile::update(args).await,
        Action::Logout(globals) => session::logout(&globals),
        Action::Guard(args) => guard::execute(args).await,
        Action::Notifications(args) => notifications::execute(args).await,
    }
}
