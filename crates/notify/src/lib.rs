//! `scantally-notify` — ephemeral, time-limited user-facing messages.

pub mod queue;
pub mod toast;

pub use queue::{NotificationQueue, TOAST_TTL_MS};
pub use toast::{Severity, ToastMessage, toast_for_event};
