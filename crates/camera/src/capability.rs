//! Capability model: what the hardware reports vs. what we track.
//!
//! `TrackCapabilities` is the raw report read from a stream's video track once
//! it becomes ready. `CameraCapabilitySet` is our reconciled view of it:
//! per-control `supported` flags, clamped current values, and the observed
//! torch/focus state. The set's lifecycle is bound to the active stream -
//! rebuilt on device switch, discarded on teardown.

use serde::{Deserialize, Serialize};

/// Focus mode as the user sees it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    Auto,
    Macro,
    Manual,
}

impl FocusMode {
    /// Cycle order: Auto -> Macro -> Manual -> Auto.
    pub fn next(self) -> Self {
        match self {
            FocusMode::Auto => FocusMode::Macro,
            FocusMode::Macro => FocusMode::Manual,
            FocusMode::Manual => FocusMode::Auto,
        }
    }
}

/// A numeric range reported by hardware for one adjustable parameter.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// The device's current setting at discovery time.
    pub current: f64,
}

/// Raw capability report from an active video track.
///
/// `None` means the track does not expose that parameter at all.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackCapabilities {
    pub torch: bool,
    pub zoom: Option<CapabilityRange>,
    pub exposure_compensation: Option<CapabilityRange>,
    pub focus_distance: Option<CapabilityRange>,
}

/// One ranged control in our tracked view.
///
/// Invariant: if `supported`, then `min <= current <= max`. If not supported,
/// `current` is meaningless and the control must never be sent to hardware.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangedControl {
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub supported: bool,
}

impl RangedControl {
    pub fn unsupported() -> Self {
        Self {
            current: 0.0,
            min: 0.0,
            max: 0.0,
            step: 0.0,
            supported: false,
        }
    }

    fn from_range(range: CapabilityRange) -> Self {
        Self {
            current: range.current.clamp(range.min, range.max),
            min: range.min,
            max: range.max,
            step: range.step,
            supported: true,
        }
    }

    /// Clamp a requested value into the reported range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Reconciled view of the active device's adjustable parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraCapabilitySet {
    pub has_torch: bool,
    /// Observed torch state (optimistically updated, rolled back on rejection).
    pub torch_on: bool,
    pub zoom: RangedControl,
    pub exposure: RangedControl,
    pub focus_mode: FocusMode,
    pub focus_distance: RangedControl,
}

impl CameraCapabilitySet {
    /// Reconcile a raw track report into the tracked view.
    ///
    /// Any parameter the track does not expose is flagged unsupported; its
    /// control is hidden from the user rather than surfaced as an error.
    pub fn discover(caps: &TrackCapabilities) -> Self {
        Self {
            has_torch: caps.torch,
            torch_on: false,
            zoom: caps
                .zoom
                .map(RangedControl::from_range)
                .unwrap_or_else(RangedControl::unsupported),
            exposure: caps
                .exposure_compensation
                .map(RangedControl::from_range)
                .unwrap_or_else(RangedControl::unsupported),
            focus_mode: FocusMode::Auto,
            focus_distance: caps
                .focus_distance
                .map(RangedControl::from_range)
                .unwrap_or_else(RangedControl::unsupported),
        }
    }
}

/// One best-effort hardware constraint request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintRequest {
    Torch(bool),
    Zoom(f64),
    ExposureCompensation(f64),
    FocusDistance(f64),
    /// Continuous autofocus.
    ContinuousFocus,
    /// Hardware macro mode (may be unsupported; see negotiator fallback).
    MacroFocus,
    /// Generic manual focus.
    ManualFocus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: f64, max: f64, current: f64) -> CapabilityRange {
        CapabilityRange {
            min,
            max,
            step: 0.1,
            current,
        }
    }

    #[test]
    fn focus_mode_cycles_back_to_auto_in_three_steps() {
        let mode = FocusMode::Auto;
        assert_eq!(mode.next().next().next(), FocusMode::Auto);
    }

    #[test]
    fn discover_clamps_current_into_range() {
        let caps = TrackCapabilities {
            torch: true,
            zoom: Some(range(1.0, 8.0, 12.0)),
            exposure_compensation: None,
            focus_distance: Some(range(0.1, 4.0, 0.05)),
        };

        let set = CameraCapabilitySet::discover(&caps);

        assert!(set.has_torch);
        assert!(!set.torch_on);
        assert_eq!(set.zoom.current, 8.0);
        assert_eq!(set.focus_distance.current, 0.1);
        assert!(!set.exposure.supported);
    }

    #[test]
    fn unsupported_controls_are_flagged_not_errored() {
        let set = CameraCapabilitySet::discover(&TrackCapabilities::default());
        assert!(!set.has_torch);
        assert!(!set.zoom.supported);
        assert!(!set.exposure.supported);
        assert!(!set.focus_distance.supported);
    }
}
