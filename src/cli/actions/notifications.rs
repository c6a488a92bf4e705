use super::context::Runtime;
use crate::{
    cli::globals::GlobalArgs,
    notifications::{Notification, NotificationFeed, spawn_poller},
};
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tokio::time::interval;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub watch: bool,
    pub mark_read: Option<i64>,
    pub mark_all_read: bool,
}

fn line(notification: &Notification) -> String {
    let marker = if notification.read { " " } else { "*" };
    let link = notification
        .link
        .as_deref()
        .map(|link| format!(" -> {link}"))
        .unwrap_or_default();
    format!(
        "{marker} [{}] {} {}: {}{link}",
        notification.id, notification.timestamp, notification.title, notification.message
    )
}

/// # Errors
/// Returns an error when no profile is signed in or the feed cannot be read.
pub async fn execute(args: Args) -> Result<()> {
    let runtime = Runtime::new(&args.globals)?;
    let step = runtime.session.bootstrap().await;
    if step.session.citizen().is_none() && step.session.admin().is_none() {
        bail!("sign in to read notifications");
    }

    let feed = Arc::new(NotificationFeed::new(runtime.api.clone()));
    if let Some(id) = args.mark_read {
        feed.mark_read(id)
            .await
            .with_context(|| format!("failed to mark notification {id} as read"))?;
    }
    if args.mark_all_read {
        feed.mark_all_read()
            .await
            .context("failed to mark notifications as read")?;
    }

    let unread = feed.refresh().await.context("failed to load notifications")?;
    for notification in feed.notifications() {
        println!("{}", line(&notification));
    }
    println!("{unread} unread");

    if !args.watch {
        return Ok(());
    }

    let poll = runtime.config.notification_poll();
    info!(seconds = poll.as_secs(), "watching notifications");
    let poller = spawn_poller(Arc::clone(&feed), runtime.session.subscribe(), poll);

    let mut ticker = interval(poll);
    let mut last = unread;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let current = feed.unread_count();
                if current != last {
                    println!("{current} unread");
                    last = current;
                }
            }
        }
    }

    poller.abort();
    Ok(())
}
