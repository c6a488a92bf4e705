//! In-memory notification list plus the background poller that keeps it fresh
//! while someone is signed in.

use super::{
    client::NotificationSource,
    types::{Notification, newest_first},
};
use crate::{
    auth::machine::{Session, SessionStatus},
    client::AppError,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::{sync::watch, task::JoinHandle, time::Duration};
use tracing::{debug, info, instrument, warn};

pub struct NotificationFeed<S> {
    source: S,
    items: Mutex<Vec<Notification>>,
}

impl<S: NotificationSource> NotificationFeed<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            items: Mutex::new(Vec::new()),
        }
    }

    fn items(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot, newest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.items().clone()
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.items().iter().filter(|item| !item.read).count()
    }

    /// Replaces the list with the server's copy and returns the unread count.
    ///
    /// # Errors
    /// Returns the transport error; the previous list is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<usize, AppError> {
        let mut fresh = self.source.list().await?;
        fresh.sort_by(newest_first);

        let mut items = self.items();
        *items = fresh;
        let unread = items.iter().filter(|item| !item.read).count();
        debug!(total = items.len(), unread, "notifications refreshed");
        Ok(unread)
    }

    /// # Errors
    /// Returns the transport error; nothing changes locally.
    pub async fn mark_read(&self, id: i64) -> Result<(), AppError> {
        self.source.mark_read(id).await?;
        if let Some(item) = self.items().iter_mut().find(|item| item.id == id) {
            item.read = true;
        }
        Ok(())
    }

    /// # Errors
    /// Returns the transport error; nothing changes locally.
    pub async fn mark_all_read(&self) -> Result<(), AppError> {
        self.source.mark_all_read().await?;
        for item in self.items().iter_mut() {
            item.read = true;
        }
        Ok(())
    }

    pub fn clear(&self) {
        self.items().clear();
    }
}

fn is_polling(session: &Session) -> bool {
    matches!(
        session.status(),
        SessionStatus::AuthenticatedCitizen | SessionStatus::AuthenticatedAdmin
    )
}

fn jittered(interval: Duration, rng: &mut impl Rng) -> Duration {
    interval.mul_f64(rng.gen_range(0.9..1.1))
}

/// Polls `feed` every `interval` (±10 %) while the session holds a resolved
/// profile. Waits while loading or pending; clears the feed and exits once the
/// session becomes anonymous or the session sender is dropped.
pub fn spawn_poller<S: NotificationSource>(
    feed: Arc<NotificationFeed<S>>,
    mut session: watch::Receiver<Session>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();

        loop {
            let (anonymous, polling) = {
                let current = session.borrow_and_update();
                (matches!(*current, Session::Anonymous), is_polling(&current))
            };

            if anonymous {
                feed.clear();
                info!("session ended, notification polling stopped");
                return;
            }

            if !polling {
                if session.changed().await.is_err() {
                    break;
                }
                continue;
            }

            if let Err(err) = feed.refresh().await {
                warn!(error = %err, "notification refresh failed");
            }

            tokio::select! {
                () = tokio::time::sleep(jittered(interval, &mut rng)) => {}
                changed = session.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        feed.clear();
        debug!("session channel closed, notification polling stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        claims::{AuthStatus, Claims},
        machine::{Identity, SessionOrigin},
        types::CitizenProfile,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        items: Vec<Notification>,
        fail: bool,
        lists: AtomicUsize,
        marked: Mutex<Vec<i64>>,
    }

    impl NotificationSource for Arc<FakeSource> {
        async fn list(&self) -> Result<Vec<Notification>, AppError> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Network("down".to_string()));
            }
            Ok(self.items.clone())
        }

        async fn mark_read(&self, id: i64) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::Network("down".to_string()));
            }
            self.marked.lock().unwrap().push(id);
            Ok(())
        }

        async fn mark_all_read(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn notification(id: i64, timestamp: &str, read: bool) -> Notification {
        Notification {
            id,
            title: format!("n{id}"),
            timestamp: timestamp.to_string(),
            read,
            ..Notification::default()
        }
    }

    fn source() -> Arc<FakeSource> {
        Arc::new(FakeSource {
            items: vec![
                notification(1, "2024-05-01T09:00:00", true),
                notification(2, "2024-05-03T09:00:00", false),
                notification(3, "2024-05-02T09:00:00", false),
            ],
            ..FakeSource::default()
        })
    }

    fn citizen_session() -> Session {
        Session::AuthenticatedCitizen {
            identity: Identity {
                claims: Claims {
                    subject_id: "42".to_string(),
                    issuer: String::new(),
                    token_type: "ACCESS".to_string(),
                    auth_status: AuthStatus::Native,
                    roles: ["USER"].iter().collect(),
                    expires_at: i64::MAX,
                },
                origin: SessionOrigin::Native,
            },
            profile: CitizenProfile::default(),
        }
    }

    #[tokio::test]
    async fn refresh_sorts_and_counts_unread() {
        let feed = NotificationFeed::new(source());
        assert_eq!(feed.refresh().await.unwrap(), 2);

        let ids: Vec<i64> = feed.notifications().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(feed.unread_count(), 2);
    }

    #[tokio::test]
    async fn mark_read_updates_after_server_success() {
        let src = source();
        let feed = NotificationFeed::new(Arc::clone(&src));
        feed.refresh().await.unwrap();

        feed.mark_read(2).await.unwrap();
        assert_eq!(feed.unread_count(), 1);
        assert_eq!(*src.marked.lock().unwrap(), vec![2]);

        feed.mark_all_read().await.unwrap();
        assert_eq!(feed.unread_count(), 0);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let feed = NotificationFeed::new(source());
        feed.refresh().await.unwrap();

        let broken = NotificationFeed::new(Arc::new(FakeSource {
            fail: true,
            ..FakeSource::default()
        }));
        assert!(broken.refresh().await.is_err());
        assert!(broken.notifications().is_empty());
        assert!(broken.mark_read(1).await.is_err());
        assert_eq!(feed.notifications().len(), 3);
    }

    #[test]
    fn jitter_stays_within_ten_percent() {
        let mut rng = StdRng::seed_from_u64(7);
        let base = Duration::from_secs(30);
        for _ in 0..100 {
            let wait = jittered(base, &mut rng);
            assert!(wait >= Duration::from_secs(27));
            assert!(wait <= Duration::from_secs(33));
        }
    }

    #[tokio::test]
    async fn poller_runs_while_signed_in_and_clears_on_sign_out() {
        let src = source();
        let feed = Arc::new(NotificationFeed::new(Arc::clone(&src)));
        let (tx, rx) = watch::channel(Session::default());

        let handle = spawn_poller(Arc::clone(&feed), rx, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(src.lists.load(Ordering::SeqCst), 0);

        tx.send_replace(citizen_session());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(src.lists.load(Ordering::SeqCst) >= 1);
        assert_eq!(feed.notifications().len(), 3);

        tx.send_replace(Session::Anonymous);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(feed.notifications().is_empty());
    }
}
