pub mod logging;
pub mod profile;

use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_USERINFO_URL: &str = "userinfo-url";
pub const ARG_POSTAL_URL: &str = "postal-url";
pub const ARG_STORE: &str = "store";

pub const CMD_STATUS: &str = "status";
pub const CMD_LOGIN: &str = "login";
pub const CMD_SIGNUP: &str = "signup";
pub const CMD_OAUTH: &str = "oauth";
pub const CMD_COMPLETE_PROFILE: &str = "complete-profile";
pub const CMD_UPDATE_PROFILE: &str = "update-profile";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_GUARD: &str = "guard";
pub const CMD_NOTIFICATIONS: &str = "notifications";

fn credential_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("login")
                .short('l')
                .long("login")
                .help("Account login (e-mail)")
                .env("VOZCIDADA_LOGIN")
                .required(true),
        )
        .arg(
            Arg::new("password")
                .short('p')
                .long("password")
                .help("Account password")
                .env("VOZCIDADA_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}

fn subcommands() -> [Command; 9] {
    [
        Command::new(CMD_STATUS).about("Restore the stored session and print it"),
        credential_args(Command::new(CMD_LOGIN).about("Sign in with login and password")),
        profile::with_args(
            credential_args(Command::new(CMD_SIGNUP).about("Create a citizen account")),
            true,
        ),
        Command::new(CMD_OAUTH)
            .about("Sign in with a Google access token")
            .arg(
                Arg::new("token")
                    .long("token")
                    .help("Google OAuth2 access token")
                    .env("VOZCIDADA_GOOGLE_TOKEN")
                    .hide_env_values(true)
                    .required(true),
            ),
        profile::with_args(
            Command::new(CMD_COMPLETE_PROFILE)
                .about("Create the profile of an account awaiting completion"),
            true,
        ),
        profile::with_args(
            Command::new(CMD_UPDATE_PROFILE).about("Edit the signed-in citizen's profile"),
            false,
        ),
        Command::new(CMD_LOGOUT).about("Sign out and remove stored credentials"),
        Command::new(CMD_GUARD)
            .about("Show how the current session is routed for a page")
            .arg(
                Arg::new("path")
                    .help("Page path, e.g. /admin/home")
                    .required(true),
            ),
        Command::new(CMD_NOTIFICATIONS)
            .about("List notifications for the signed-in user")
            .arg(
                Arg::new("watch")
                    .short('w')
                    .long("watch")
                    .help("Keep polling and report unread changes until interrupted")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("mark-read")
                    .long("mark-read")
                    .help("Mark one notification as read")
                    .value_parser(clap::value_parser!(i64)),
            )
            .arg(
                Arg::new("mark-all-read")
                    .long("mark-all-read")
                    .help("Mark every notification as read")
                    .action(ArgAction::SetTrue)
                    .conflicts_with("mark-read"),
            ),
    ]
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("vozcidada")
        .about("Voz Cidadã session client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Backend base URL")
                .env("VOZCIDADA_API_BASE_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_USERINFO_URL)
                .long(ARG_USERINFO_URL)
                .help("Google userinfo endpoint")
                .env("VOZCIDADA_USERINFO_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_POSTAL_URL)
                .long(ARG_POSTAL_URL)
                .help("Postal-code lookup base URL")
                .env("VOZCIDADA_POSTAL_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STORE)
                .long(ARG_STORE)
                .help("Credential store file (default: $XDG_STATE_HOME/vozcidada/session.json)")
                .env("VOZCIDADA_STORE")
                .global(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .subcommands(subcommands());

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::logging::ARG_VERBOSITY;
    use std::path::PathBuf;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "vozcidada");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Voz Cidadã session client"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
        assert_eq!(command.get_subcommands().count(), 9);
    }

    #[test]
    fn test_login_args() {
        temp_env::with_vars(
            [
                ("VOZCIDADA_LOGIN", None::<&str>),
                ("VOZCIDADA_PASSWORD", None::<&str>),
            ],
            || {
                let matches = new().get_matches_from(vec![
                    "vozcidada",
                    "--api-url",
                    "https://api.vozcidada.test",
                    "login",
                    "--login",
                    "maria@example.com",
                    "--password",
                    "secret",
                ]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).map(String::as_str),
                    Some("https://api.vozcidada.test")
                );
                let (name, sub) = matches.subcommand().unwrap();
                assert_eq!(name, CMD_LOGIN);
                assert_eq!(
                    sub.get_one::<String>("login").map(String::as_str),
                    Some("maria@example.com")
                );
            },
        );
    }

    #[test]
    fn test_login_requires_password() {
        temp_env::with_vars([("VOZCIDADA_PASSWORD", None::<&str>)], || {
            let result =
                new().try_get_matches_from(vec!["vozcidada", "login", "--login", "maria"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("VOZCIDADA_API_BASE_URL", Some("https://api.env.test")),
                ("VOZCIDADA_STORE", Some("/tmp/vozcidada-session.json")),
                ("VOZCIDADA_LOG_LEVEL", Some("info")),
                ("VOZCIDADA_LOG_FORMAT", Some("json")),
            ],
            || {
                let matches = new().get_matches_from(vec!["vozcidada", "status"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).map(String::as_str),
                    Some("https://api.env.test")
                );
                assert_eq!(
                    matches.get_one::<PathBuf>(ARG_STORE),
                    Some(&PathBuf::from("/tmp/vozcidada-session.json"))
                );
                assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(2));
                assert_eq!(
                    matches
                        .get_one::<String>(logging::ARG_LOG_FORMAT)
                        .map(String::as_str),
                    Some("json")
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("VOZCIDADA_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["vozcidada", "status"]);
                assert_eq!(
                    matches.get_one::<u8>(ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("VOZCIDADA_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["vozcidada".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }
                args.push("status".to_string());

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }

    #[test]
    fn test_notifications_flags_conflict() {
        let result = new().try_get_matches_from(vec![
            "vozcidada",
            "notifications",
            "--mark-read",
            "3",
            "--mark-all-read",
        ]);
        assert!(result.is_err());
    }
}
