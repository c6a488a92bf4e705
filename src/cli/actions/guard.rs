use super::context::{Runtime, describe};
use crate::{
    auth::GuardDecision,
    cli::globals::GlobalArgs,
    routes::Route,
};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub path: String,
}

#[must_use]
pub fn verdict(route: Route, decision: GuardDecision) -> String {
    match decision {
        GuardDecision::Render => format!("{route}: render"),
        GuardDecision::Suspend => format!("{route}: suspend until the session settles"),
        GuardDecision::Redirect(target) => format!("{route}: redirect to {target}"),
    }
}

/// Restores the session and prints the guard decision for `path`.
/// # Errors
/// Returns an error if the runtime cannot be built.
pub async fn execute(args: Args) -> Result<()> {
    let runtime = Runtime::new(&args.globals)?;
    runtime.session.bootstrap().await;

    let route = Route::from_path(&args.path);
    println!("{}", describe(&runtime.session.session()));
    println!("{}", verdict(route, runtime.session.guard(route)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdicts_name_the_target() {
        assert_eq!(
            verdict(Route::AdminHome, GuardDecision::Redirect(Route::SignIn)),
            "/admin/home: redirect to /signin"
        );
        assert_eq!(verdict(Route::Home, GuardDecision::Render), "/home: render");
    }
}
