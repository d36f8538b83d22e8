//! Scan-session arming state machine.

use serde::{Deserialize, Serialize};

/// Whether decode events are currently allowed to reach the ledger.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Decode events are ignored. The filter still runs (its reference point
    /// keeps advancing) but accepted reads are discarded.
    Standby,
    /// The next accepted read is recorded, then the session disarms itself.
    Armed,
}

/// Session gate between the decode filter and the ledger.
///
/// One successful scan per arming: recording a read while armed drops the
/// session back to `Standby`, so the user can reposition the device without
/// re-reading the same physical label. Lives as long as the scanning surface
/// is mounted; there is no terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSession {
    state: SessionState,
}

impl ScanSession {
    /// Sessions start in `Standby`.
    pub fn new() -> Self {
        Self {
            state: SessionState::Standby,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == SessionState::Armed
    }

    /// User toggle: flips between `Standby` and `Armed`.
    pub fn toggle(&mut self) -> SessionState {
        self.state = match self.state {
            SessionState::Standby => SessionState::Armed,
            SessionState::Armed => SessionState::Standby,
        };
        tracing::debug!(state = ?self.state, "scan session toggled");
        self.state
    }

    /// Gate one accepted read.
    ///
    /// Returns `true` iff the read may be recorded; a successful admission
    /// automatically disarms the session.
    pub fn admit_scan(&mut self) -> bool {
        match self.state {
            SessionState::Armed => {
                self.state = SessionState::Standby;
                true
            }
            SessionState::Standby => false,
        }
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}
