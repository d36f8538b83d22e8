//! `scantally-events` — event trait, pub/sub bus, deterministic execution.
//!
//! The presentation layer does not observe ledger state reactively; it
//! subscribes to the event feed published here and re-reads state on change.

pub mod bus;
pub mod event;
pub mod handler;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use handler::execute;
pub use in_memory_bus::InMemoryEventBus;
