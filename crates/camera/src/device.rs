//! Device enumeration and cyclic selection.

use serde::{Deserialize, Serialize};

use scantally_core::DeviceId;

use crate::error::CameraError;

/// Label tokens that usually mark a rear-facing camera. Multi-lens phones
/// list several matches; empirically the last one is the main (highest
/// quality) sensor.
const BACK_CAMERA_TOKENS: &[&str] = &["back", "rear", "environment", "world"];

/// One enumerated video-input device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub label: String,
}

impl DeviceInfo {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: DeviceId::new(id),
            label: label.into(),
        }
    }

    fn looks_rear_facing(&self) -> bool {
        let label = self.label.to_lowercase();
        BACK_CAMERA_TOKENS.iter().any(|t| label.contains(t))
    }
}

/// Ordered list of available camera devices with one active selection.
///
/// Selection past the last index wraps to the first (cyclic switch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceList {
    devices: Vec<DeviceInfo>,
    active: usize,
}

impl DeviceList {
    /// Build a list from an enumeration result, pre-selecting the likely
    /// rear camera (last label match), or the first device if none match.
    pub fn from_enumeration(devices: Vec<DeviceInfo>) -> Result<Self, CameraError> {
        if devices.is_empty() {
            return Err(CameraError::NoDevices);
        }
        let active = devices
            .iter()
            .rposition(DeviceInfo::looks_rear_facing)
            .unwrap_or(0);
        tracing::debug!(
            count = devices.len(),
            selected = %devices[active].label,
            "enumerated camera devices"
        );
        Ok(Self { devices, active })
    }

    pub fn active(&self) -> &DeviceInfo {
        &self.devices[self.active]
    }

    /// Advance to the next device, wrapping past the end.
    pub fn advance(&mut self) -> &DeviceInfo {
        self.active = (self.active + 1) % self.devices.len();
        self.active()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceInfo> {
        self.devices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(labels: &[&str]) -> DeviceList {
        let devices = labels
            .iter()
            .enumerate()
            .map(|(i, l)| DeviceInfo::new(format!("dev-{i}"), *l))
            .collect();
        DeviceList::from_enumeration(devices).unwrap()
    }

    #[test]
    fn empty_enumeration_is_an_error() {
        assert_eq!(
            DeviceList::from_enumeration(vec![]).unwrap_err(),
            CameraError::NoDevices
        );
    }

    #[test]
    fn preselects_last_rear_facing_match() {
        let devices = list(&[
            "Front Camera",
            "Back Ultra Wide Camera",
            "Back Telephoto Camera",
            "Front TrueDepth",
        ]);
        assert_eq!(devices.active().label, "Back Telephoto Camera");
    }

    #[test]
    fn match_is_case_insensitive() {
        let devices = list(&["front cam", "REAR CAM"]);
        assert_eq!(devices.active().label, "REAR CAM");
    }

    #[test]
    fn falls_back_to_first_device_without_a_match() {
        let devices = list(&["Integrated Webcam", "USB Capture"]);
        assert_eq!(devices.active().label, "Integrated Webcam");
    }

    #[test]
    fn advance_wraps_past_the_end() {
        let mut devices = list(&["Front", "Back"]);
        assert_eq!(devices.active().label, "Back");
        assert_eq!(devices.advance().label, "Front");
        assert_eq!(devices.advance().label, "Back");
    }
}
