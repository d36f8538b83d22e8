//! `scantally-scan` — decode-event debouncing and scan-session gating.
//!
//! Raw decode events arrive at camera frame-rate and are noisy: the same label
//! decodes on many consecutive frames. The filter collapses those repeats; the
//! session decides whether an accepted read may touch the ledger at all.

pub mod decode;
pub mod session;

pub use decode::{DecodeEvent, DecodeFilter, ScanDisposition};
pub use session::{ScanSession, SessionState};
