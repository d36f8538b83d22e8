//! Camera error taxonomy.

use thiserror::Error;

/// Errors from device enumeration, stream acquisition, and constraint
/// application.
///
/// Only `AccessDenied` is fatal to the scanning surface: without camera
/// permission no decode event can ever arrive, so it is surfaced as a
/// persistent blocking state rather than a transient toast. Everything else
/// degrades the session instead of ending it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// Camera permission refused by the user/platform.
    #[error("camera access denied")]
    AccessDenied,

    /// Enumeration found no video-input devices.
    #[error("no camera devices available")]
    NoDevices,

    /// Stream acquisition failed for a reason other than permission.
    #[error("stream acquisition failed: {0}")]
    Stream(String),

    /// The device/driver rejected an individual constraint request.
    #[error("constraint rejected: {0}")]
    ConstraintRejected(String),

    /// No stream is active; capability requests need one.
    #[error("no active stream")]
    NoStream,

    /// The operation belonged to a device switch that has been superseded.
    #[error("superseded by a newer device switch")]
    Superseded,
}

impl CameraError {
    /// Whether this error ends the scanning surface.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CameraError::AccessDenied)
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::ConstraintRejected(msg.into())
    }

    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }
}
