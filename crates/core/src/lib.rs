//! `scantally-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod barcode;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot};
pub use barcode::Barcode;
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, DeviceId, ToastId};
