//! Durable storage for the access/refresh credential pair and the transient
//! OAuth-origin marker. This is the only component that reads or writes
//! persisted credentials. Every entry carries its own expiry; a pair with a
//! missing or expired half reads as absent so callers never act on partial state.
//! Token values are wrapped in `SecretString` and must never be logged.

use super::error::StoreError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tracing::{debug, warn};

/// Access and refresh tokens issued together by one exchange.
#[derive(Clone)]
pub struct CredentialPair {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
}

impl CredentialPair {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
        }
    }
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"***")
            .field("refresh_token", &"***")
            .finish()
    }
}

/// Persisted credential storage shared by every session in the process.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored pair, or `None` when either token is missing or expired.
    fn get(&self) -> Option<CredentialPair>;

    /// Overwrites both tokens in one operation and drops any OAuth marker.
    ///
    /// # Errors
    /// Returns an error when the backing storage cannot be written.
    fn set(
        &self,
        pair: &CredentialPair,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Removes both tokens and the OAuth marker. Idempotent.
    ///
    /// # Errors
    /// Returns an error when the backing storage cannot be removed.
    fn clear(&self) -> Result<(), StoreError>;

    /// Like [`Self::set`], but also records, in the same write, that the pair
    /// came from the OAuth flow. The marker expires after `marker_ttl`.
    ///
    /// # Errors
    /// Returns an error when the backing storage cannot be written.
    fn set_oauth(
        &self,
        pair: &CredentialPair,
        access_ttl: Duration,
        refresh_ttl: Duration,
        marker_ttl: Duration,
    ) -> Result<(), StoreError>;

    fn is_oauth(&self) -> bool;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access: Option<StoredToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh: Option<StoredToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    oauth_expires_at: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
struct StoredToken {
    value: String,
    expires_at: i64,
}

impl StoredToken {
    fn live_value(&self, now: i64) -> Option<&str> {
        (self.expires_at > now).then_some(self.value.as_str())
    }
}

/// Expiries for one write: both tokens and, for OAuth pairs, the marker.
#[derive(Clone, Copy, Debug)]
struct Lifetimes {
    access: Duration,
    refresh: Duration,
    oauth_marker: Option<Duration>,
}

impl StoredCredentials {
    fn issue(pair: &CredentialPair, lifetimes: Lifetimes, now: i64) -> Self {
        let Lifetimes {
            access: access_ttl,
            refresh: refresh_ttl,
            oauth_marker,
        } = lifetimes;
        Self {
            access: Some(StoredToken {
                value: pair.access_token.expose_secret().to_string(),
                expires_at: expires_at(now, access_ttl),
            }),
            refresh: Some(StoredToken {
                value: pair.refresh_token.expose_secret().to_string(),
                expires_at: expires_at(now, refresh_ttl),
            }),
            oauth_expires_at: oauth_marker.map(|ttl| expires_at(now, ttl)),
        }
    }

    fn pair_at(&self, now: i64) -> Option<CredentialPair> {
        let access = self.access.as_ref()?.live_value(now)?;
        let refresh = self.refresh.as_ref()?.live_value(now)?;
        Some(CredentialPair::new(access, refresh))
    }

    fn oauth_at(&self, now: i64) -> bool {
        self.oauth_expires_at.is_some_and(|expiry| expiry > now)
    }
}

/// Current time as unix seconds.
#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

fn expires_at(now: i64, ttl: Duration) -> i64 {
    now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

/// In-process store, used by tests and embedders that manage persistence
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<StoredCredentials>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self, pair: &CredentialPair, lifetimes: Lifetimes) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        *inner = StoredCredentials::issue(pair, lifetimes, unix_now());
        Ok(())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<CredentialPair> {
        self.inner.lock().ok()?.pair_at(unix_now())
    }

    fn set(
        &self,
        pair: &CredentialPair,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<(), StoreError> {
        self.store(pair, Lifetimes {
            access: access_ttl,
            refresh: refresh_ttl,
            oauth_marker: None,
        })
    }

    fn set_oauth(
        &self,
        pair: &CredentialPair,
        access_ttl: Duration,
        refresh_ttl: Duration,
        marker_ttl: Duration,
    ) -> Result<(), StoreError> {
        self.store(pair, Lifetimes {
            access: access_ttl,
            refresh: refresh_ttl,
            oauth_marker: Some(marker_ttl),
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        *inner = StoredCredentials::default();
        Ok(())
    }

    fn is_oauth(&self) -> bool {
        self.inner
            .lock()
            .is_ok_and(|inner| inner.oauth_at(unix_now()))
    }
}

/// JSON file store. Writes replace the file atomically through a sibling
/// temporary file so readers never observe a half-written pair.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unreadable or corrupt files read as empty.
    fn read(&self) -> StoredCredentials {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return StoredCredentials::default();
            }
            Err(err) => {
                warn!("Failed to read credential store {}: {err}", self.path.display());
                return StoredCredentials::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!(
                "Ignoring corrupt credential store {}: {err}",
                self.path.display()
            );
            StoredCredentials::default()
        })
    }

    fn write(&self, credentials: &StoredCredentials) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let payload = serde_json::to_vec_pretty(credentials)?;
        let tmp_path = self.tmp_path();
        remove_if_present(&tmp_path)?;
        let written =
            write_private(&tmp_path, &payload).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(err) = written {
            if let Err(cleanup) = remove_if_present(&tmp_path) {
                warn!("Failed to remove {}: {cleanup}", tmp_path.display());
            }
            return Err(err.into());
        }

        debug!("credential store written: {}", self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn store(&self, pair: &CredentialPair, lifetimes: Lifetimes) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.write(&StoredCredentials::issue(pair, lifetimes, unix_now()))
    }
}

/// Creates `path` owner-only from the start; the token bytes never sit in a
/// file readable by others.
fn write_private(path: &Path, payload: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(payload)?;
    file.sync_all()
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        result => result,
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<CredentialPair> {
        let _guard = self.lock.lock().ok()?;
        self.read().pair_at(unix_now())
    }

    fn set(
        &self,
        pair: &CredentialPair,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<(), StoreError> {
        self.store(pair, Lifetimes {
            access: access_ttl,
            refresh: refresh_ttl,
            oauth_marker: None,
        })
    }

    fn set_oauth(
        &self,
        pair: &CredentialPair,
        access_ttl: Duration,
        refresh_ttl: Duration,
        marker_ttl: Duration,
    ) -> Result<(), StoreError> {
        self.store(pair, Lifetimes {
            access: access_ttl,
            refresh: refresh_ttl,
            oauth_marker: Some(marker_ttl),
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        remove_if_present(&self.tmp_path())?;
        remove_if_present(&self.path)?;
        Ok(())
    }

    fn is_oauth(&self) -> bool {
        let Ok(_guard) = self.lock.lock() else {
            return false;
        };
        self.read().oauth_at(unix_now())
    }
}
