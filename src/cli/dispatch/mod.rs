//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action to run, resolving the shared
//! settings (backend URLs, credential store location) once for all of them.

use crate::cli::{
    actions::{Action, guard, notifications, profile, session},
    commands::{self, profile::Options},
    globals::{GlobalArgs, default_store_path},
};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use secrecy::SecretString;
use std::path::PathBuf;

fn globals(matches: &ArgMatches) -> GlobalArgs {
    let get = |id: &str| matches.get_one::<String>(id).cloned();
    GlobalArgs {
        api_url: get(commands::ARG_API_URL),
        userinfo_url: get(commands::ARG_USERINFO_URL),
        postal_url: get(commands::ARG_POSTAL_URL),
        store_path: matches
            .get_one::<PathBuf>(commands::ARG_STORE)
            .cloned()
            .unwrap_or_else(default_store_path),
    }
}

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

fn secret(matches: &ArgMatches, id: &str) -> Result<SecretString> {
    required(matches, id).map(SecretString::from)
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if a subcommand or one of its required arguments is missing.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = globals(matches);
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("missing subcommand"))?;

    let action = match name {
        commands::CMD_STATUS => Action::Status(globals),
        commands::CMD_LOGIN => Action::Login(session::LoginArgs {
            globals,
            login: required(sub, "login")?,
            password: secret(sub, "password")?,
        }),
        commands::CMD_SIGNUP => Action::SignUp(session::SignUpArgs {
            globals,
            login: required(sub, "login")?,
            password: secret(sub, "password")?,
            profile: Options::parse(sub),
        }),
        commands::CMD_OAUTH => Action::OAuth(session::OAuthArgs {
            globals,
            token: secret(sub, "token")?,
        }),
        commands::CMD_COMPLETE_PROFILE => Action::CompleteProfile(profile::Args {
            globals,
            profile: Options::parse(sub),
        }),
        commands::CMD_UPDATE_PROFILE => Action::UpdateProfile(profile::Args {
            globals,
            profile: Options::parse(sub),
        }),
        commands::CMD_LOGOUT => Action::Logout(globals),
        commands::CMD_GUARD => Action::Guard(guard::Args {
            globals,
            path: required(sub, "path")?,
        }),
        commands::CMD_NOTIFICATIONS => Action::Notifications(notifications::Args {
            globals,
            watch: sub.get_flag("watch"),
            mark_read: sub.get_one::<i64>("mark-read").copied(),
            mark_all_read: sub.get_flag("mark-all-read"),
        }),
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn dispatch(args: &[&str]) -> Result<Action> {
        let matches = commands::new().get_matches_from(args);
        handler(&matches)
    }

    #[test]
    fn login_carries_secret_password() {
        temp_env::with_vars(
            [
                ("VOZCIDADA_STORE", Some("/tmp/vozcidada/session.json")),
                ("VOZCIDADA_PASSWORD", None::<&str>),
            ],
            || {
                let action = dispatch(&[
                    "vozcidada",
                    "login",
                    "--login",
                    "maria@example.com",
                    "--password",
                    "secret",
                ])
                .unwrap();
                let Action::Login(args) = action else {
                    panic!("expected login action");
                };
                assert_eq!(args.login, "maria@example.com");
                assert_eq!(args.password.expose_secret(), "secret");
                assert_eq!(
                    args.globals.store_path,
                    PathBuf::from("/tmp/vozcidada/session.json")
                );
            },
        );
    }

    #[test]
    fn store_defaults_to_state_dir() {
        temp_env::with_vars(
            [
                ("VOZCIDADA_STORE", None::<&str>),
                ("XDG_STATE_HOME", Some("/state")),
            ],
            || {
                let Action::Status(globals) = dispatch(&["vozcidada", "status"]).unwrap() else {
                    panic!("expected status action");
                };
                assert_eq!(
                    globals.store_path,
                    PathBuf::from("/state/vozcidada/session.json")
                );
            },
        );
    }

    #[test]
    fn guard_and_notifications_arguments() {
        let Action::Guard(args) = dispatch(&["vozcidada", "guard", "/admin/home"]).unwrap() else {
            panic!("expected guard action");
        };
        assert_eq!(args.path, "/admin/home");

        let Action::Notifications(args) =
            dispatch(&["vozcidada", "notifications", "--watch", "--mark-read", "4"]).unwrap()
        else {
            panic!("expected notifications action");
        };
        assert!(args.watch);
        assert_eq!(args.mark_read, Some(4));
        assert!(!args.mark_all_read);
    }

    #[test]
    fn update_profile_collects_only_given_fields() {
        let Action::UpdateProfile(args) =
            dispatch(&["vozcidada", "update-profile", "--cidade", "Santos"]).unwrap()
        else {
            panic!("expected update-profile action");
        };
        assert_eq!(args.profile.cidade.as_deref(), Some("Santos"));
        assert_eq!(args.profile.nome, None);
    }
}
