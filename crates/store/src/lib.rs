//! `scantally-store` — thin persistence and export collaborators.
//!
//! Neither is part of the core's runtime state: persistence is a trivial
//! load/save of the item list, export is a pure one-shot transform.

pub mod export;
pub mod persist;

pub use export::{export_file_name, write_csv};
pub use persist::StockFile;
