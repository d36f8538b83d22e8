//! Toast message type and ledger-event rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scantally_core::ToastId;
use scantally_ledger::TallyEvent;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// One user-facing message. Self-destructs after the display duration,
/// independent of other state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastMessage {
    pub id: ToastId,
    pub text: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

/// Render a scan outcome as toast content.
///
/// Only scan outcomes are announced; list-view adjustments and deletions give
/// immediate visual feedback in place and get no toast.
pub fn toast_for_event(event: &TallyEvent) -> Option<(String, Severity)> {
    match event {
        TallyEvent::ItemAdded { barcode, .. } => {
            Some((format!("{barcode}: added to the list"), Severity::Success))
        }
        TallyEvent::ItemIncremented { barcode, quantity, .. } => Some((
            format!("{barcode}: quantity increased ({quantity})"),
            Severity::Success,
        )),
        TallyEvent::QuantityChanged { .. }
        | TallyEvent::ItemRemoved { .. }
        | TallyEvent::Cleared { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scantally_core::Barcode;

    #[test]
    fn scan_outcomes_distinguish_created_from_incremented() {
        let added = TallyEvent::ItemAdded {
            barcode: Barcode::new("111").unwrap(),
            quantity: 1,
            occurred_at: Utc::now(),
        };
        let bumped = TallyEvent::ItemIncremented {
            barcode: Barcode::new("111").unwrap(),
            quantity: 2,
            occurred_at: Utc::now(),
        };

        let (added_text, _) = toast_for_event(&added).unwrap();
        let (bumped_text, _) = toast_for_event(&bumped).unwrap();

        assert!(added_text.contains("added"));
        assert!(bumped_text.contains("(2)"));
        assert_ne!(added_text, bumped_text);
    }

    #[test]
    fn list_adjustments_are_silent() {
        let removed = TallyEvent::ItemRemoved {
            barcode: Barcode::new("111").unwrap(),
            occurred_at: Utc::now(),
        };
        assert!(toast_for_event(&removed).is_none());
    }
}
