//! `scantally-app` — wiring of the scan-to-quantity pipeline.
//!
//! camera black-box -> decode filter -> session gate -> ledger -> toasts,
//! with persistence after every mutation and export on demand.

pub mod pipeline;
pub mod signal;

pub use pipeline::{Confirmation, ScanPipeline};
pub use signal::CameraSignal;
