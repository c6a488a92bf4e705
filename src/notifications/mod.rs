//! Notification bell: the backend feed of per-user notifications, kept newest
//! first and polled in the background while a profile is signed in.

pub mod client;
pub mod feed;
pub mod types;

pub use client::NotificationSource;
pub use feed::{NotificationFeed, spawn_poller};
pub use types::Notification;
