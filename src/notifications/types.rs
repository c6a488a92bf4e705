use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// In-app notification addressed to the signed-in user.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// ISO-8601 timestamp as emitted by the backend.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Newest first. ISO-8601 timestamps in one format order lexically; ties fall
/// back to the higher id.
pub(crate) fn newest_first(a: &Notification, b: &Notification) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| b.id.cmp(&a.id))
}
