use crate::client::AppConfig;
use std::{env, path::PathBuf};

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    pub api_url: Option<String>,
    pub userinfo_url: Option<String>,
    pub postal_url: Option<String>,
    pub store_path: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(store_path: PathBuf) -> Self {
        Self {
            store_path,
            ..Self::default()
        }
    }

    /// Environment-derived configuration with command-line flags on top.
    #[must_use]
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::load();
        let overrides = [
            (&self.api_url, &mut config.api_base_url),
            (&self.userinfo_url, &mut config.userinfo_url),
            (&self.postal_url, &mut config.postal_url),
        ];
        for (value, target) in overrides {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                *target = value.to_string();
            }
        }
        config
    }
}

/// `$XDG_STATE_HOME/vozcidada/session.json`, falling back to
/// `$HOME/.vozcidada/session.json` and finally the working directory.
#[must_use]
pub fn default_store_path() -> PathBuf {
    let non_empty = |key: &str| env::var_os(key).filter(|value| !value.is_empty());

    if let Some(state) = non_empty("XDG_STATE_HOME") {
        return PathBuf::from(state).join("vozcidada").join("session.json");
    }
    non_empty("HOME").map_or_else(
        || PathBuf::from(".vozcidada").join("session.json"),
        |home| PathBuf::from(home).join(".vozcidada").join("session.json"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(PathBuf::from("/tmp/session.json"));
        assert_eq!(args.store_path, PathBuf::from("/tmp/session.json"));
        assert_eq!(args.api_url, None);
    }

    #[test]
    fn flags_override_environment() {
        temp_env::with_vars(
            [
                ("VOZCIDADA_API_BASE_URL", Some("https://api.env.test")),
                ("VOZCIDADA_POSTAL_URL", Some("https://cep.env.test")),
            ],
            || {
                let args = GlobalArgs {
                    api_url: Some("https://api.flag.test".to_string()),
                    postal_url: Some("  ".to_string()),
                    ..GlobalArgs::default()
                };
                let config = args.config();
                assert_eq!(config.api_base_url, "https://api.flag.test");
                assert_eq!(config.postal_url, "https://cep.env.test");
            },
        );
    }

    #[test]
    fn store_path_prefers_xdg_state_home() {
        temp_env::with_vars(
            [
                ("XDG_STATE_HOME", Some("/state")),
                ("HOME", Some("/home/maria")),
            ],
            || {
                assert_eq!(
                    default_store_path(),
                    PathBuf::from("/state/vozcidada/session.json")
                );
            },
        );
        temp_env::with_vars(
            [
                ("XDG_STATE_HOME", None::<&str>),
                ("HOME", Some("/home/maria")),
            ],
            || {
                assert_eq!(
                    default_store_path(),
                    PathBuf::from("/home/maria/.vozcidada/session.json")
                );
            },
        );
    }
}
