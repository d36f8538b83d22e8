//! Camera black-box signal type.
//!
//! The camera subsystem is callback-shaped; modelling its output as one
//! message enum over the event bus decouples the pipeline from any particular
//! stream-acquisition mechanism and makes it drivable by synthetic sequences.

use scantally_camera::{CameraError, TrackCapabilities};
use scantally_scan::DecodeEvent;

/// One message from the camera subsystem.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraSignal {
    /// A barcode was decoded from a video frame.
    Decode(DecodeEvent),
    /// A stream's video track became ready; capabilities are readable.
    StreamReady(TrackCapabilities),
    /// Something went wrong in the camera subsystem.
    Error(CameraError),
}
