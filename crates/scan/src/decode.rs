//! Single-slot decode debounce.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One successful barcode-to-text decoding result from a video frame.
///
/// Ephemeral: consumed once by the filter, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeEvent {
    pub text: String,
    pub observed_at: DateTime<Utc>,
}

impl DecodeEvent {
    pub fn new(text: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            observed_at,
        }
    }
}

/// Outcome of running an event through the filter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScanDisposition {
    Accepted,
    /// Consecutive identical read inside the duplicate window.
    Suppressed,
}

/// How long a repeat of the last accepted text is treated as the same
/// physical read.
pub const DUPLICATE_WINDOW_MS: i64 = 1500;

/// Deduplicates consecutive identical reads.
///
/// This is a **single-slot** debounce, not a per-barcode one: scanning
/// A, B, A in quick succession accepts all three, because B replaces A as the
/// reference point. Only back-to-back repeats of the same text inside the
/// window are suppressed.
#[derive(Debug, Default)]
pub struct DecodeFilter {
    last_accepted: Option<(String, DateTime<Utc>)>,
}

impl DecodeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept or suppress one decode event.
    ///
    /// An accepted event becomes the new reference point, so the window is
    /// always measured from the last *accepted* read of that text.
    pub fn accept(&mut self, event: &DecodeEvent) -> ScanDisposition {
        if let Some((text, at)) = &self.last_accepted {
            let elapsed = event.observed_at - *at;
            if *text == event.text && elapsed < Duration::milliseconds(DUPLICATE_WINDOW_MS) {
                tracing::trace!(text = %event.text, "suppressed duplicate read");
                return ScanDisposition::Suppressed;
            }
        }
        self.last_accepted = Some((event.text.clone(), event.observed_at));
        ScanDisposition::Accepted
    }
}
