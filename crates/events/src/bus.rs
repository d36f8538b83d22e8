//! Event publishing/subscription abstraction (mechanics only).
//!
//! A lightweight pub/sub layer with broadcast semantics: each subscriber gets
//! a copy of every published message. It carries two kinds of traffic:
//!
//! - ledger events, fanned out to the presentation layer so it can re-render
//!   after a mutation instead of observing state implicitly;
//! - camera signals (decode results, stream readiness, errors), so the scan
//!   pipeline can be driven by synthetic sequences in tests without hardware.
//!
//! The bus is for distribution, not storage. The ledger itself (plus the
//! persisted item list) is the source of truth; a missed toast is cosmetic.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to a message stream.
///
/// Each subscription gets a copy of all messages published after it was
/// created. Designed for single-threaded consumption: one subscription per
/// consumer loop.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently queued without blocking.
    pub fn drain(&self) -> Vec<M> {
        let mut out = Vec::new();
        while let Ok(m) = self.try_recv() {
            out.push(m);
        }
        out
    }
}

/// Domain-agnostic message bus (pub/sub abstraction).
///
/// Transport-agnostic: the in-memory implementation is enough for a
/// single-process scanning surface, but nothing here assumes it.
///
/// `publish()` can fail (e.g. poisoned internal state); failures are surfaced
/// to the caller, which may drop the message — events are derived from state
/// that is persisted independently, so re-publication is never required for
/// correctness.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
