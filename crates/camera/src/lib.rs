//! `scantally-camera` — camera capability negotiation.
//!
//! Discovers what the active device can actually do (torch, zoom, exposure,
//! focus), maps user intent onto hardware constraint requests, and tolerates
//! partial or failed support per device. Owns the active stream exclusively;
//! the ledger and session machine never touch it.

pub mod capability;
pub mod device;
pub mod error;
pub mod negotiator;

pub use capability::{
    CameraCapabilitySet, CapabilityRange, ConstraintRequest, FocusMode, RangedControl,
    TrackCapabilities,
};
pub use device::{DeviceInfo, DeviceList};
pub use error::CameraError;
pub use negotiator::{CameraControl, CapabilityNegotiator, SwitchTicket};
