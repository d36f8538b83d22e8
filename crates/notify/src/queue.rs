//! Notification queue with per-entry expiry.

use chrono::{DateTime, Duration, Utc};

use scantally_core::ToastId;

use crate::toast::{Severity, ToastMessage};

/// How long a toast stays visible after creation.
pub const TOAST_TTL_MS: i64 = 2000;

/// Queue of live toasts.
///
/// Each entry expires exactly [`TOAST_TTL_MS`] after its own creation,
/// independent of queue size or other entries. Time is passed in explicitly,
/// so expiry is deterministic; an async driver only has to call
/// `purge_expired` periodically.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    toasts: Vec<ToastMessage>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a toast; returns its id.
    pub fn enqueue(
        &mut self,
        text: impl Into<String>,
        severity: Severity,
        now: DateTime<Utc>,
    ) -> ToastId {
        let toast = ToastMessage {
            id: ToastId::new(),
            text: text.into(),
            severity,
            created_at: now,
        };
        let id = toast.id;
        tracing::debug!(text = %toast.text, "toast enqueued");
        self.toasts.push(toast);
        id
    }

    /// Live toasts at `now`, oldest first (presentation may reverse).
    pub fn active(&self, now: DateTime<Utc>) -> Vec<&ToastMessage> {
        self.toasts
            .iter()
            .filter(|t| Self::is_live(t, now))
            .collect()
    }

    /// Whether a specific toast is still visible at `now`.
    pub fn contains(&self, id: ToastId, now: DateTime<Utc>) -> bool {
        self.toasts
            .iter()
            .any(|t| t.id == id && Self::is_live(t, now))
    }

    /// Drop expired entries. Safe to call at any cadence.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.toasts.retain(|t| Self::is_live(t, now));
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    fn is_live(toast: &ToastMessage, now: DateTime<Utc>) -> bool {
        now - toast.created_at < Duration::milliseconds(TOAST_TTL_MS)
    }
}
