//! The scan pipeline: filter -> session gate -> ledger -> toasts -> disk.

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use scantally_camera::CameraError;
use scantally_core::{AggregateId, Barcode, DomainResult};
use scantally_events::{EventBus, InMemoryEventBus, Subscription, execute};
use scantally_ledger::{StockItem, TallyCommand, TallyEvent, TallyLedger, TallyLedgerId};
use scantally_notify::{NotificationQueue, Severity, ToastMessage, toast_for_event};
use scantally_scan::{DecodeEvent, DecodeFilter, ScanDisposition, ScanSession, SessionState};
use scantally_store::StockFile;

use crate::signal::CameraSignal;

/// Explicit yes/no from the presentation layer.
///
/// Destructive ledger operations require it; the ledger itself is
/// unconditional, so the gate lives here at the caller boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// Owns the business-logic state and applies every mutation serially.
///
/// There is exactly one producer of scan events (the camera subsystem), gated
/// by the decode filter and the session machine before anything reaches the
/// ledger, so no locking is needed around ledger state.
pub struct ScanPipeline {
    filter: DecodeFilter,
    session: ScanSession,
    ledger: TallyLedger,
    notifications: NotificationQueue,
    store: StockFile,
    bus: Arc<InMemoryEventBus<TallyEvent>>,
    /// Camera access denial: persistent blocking state, not a toast.
    fatal: Option<CameraError>,
}

impl ScanPipeline {
    /// Build a pipeline, rehydrating the ledger from the stock file.
    pub fn new(store: StockFile) -> Self {
        let items = store.load();
        let ledger = TallyLedger::from_items(TallyLedgerId::new(AggregateId::new()), items);
        Self {
            filter: DecodeFilter::new(),
            session: ScanSession::new(),
            ledger,
            notifications: NotificationQueue::new(),
            store,
            bus: Arc::new(InMemoryEventBus::new()),
            fatal: None,
        }
    }

    pub fn ledger(&self) -> &TallyLedger {
        &self.ledger
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// The persistent blocking error, if the surface is dead.
    pub fn fatal_error(&self) -> Option<&CameraError> {
        self.fatal.as_ref()
    }

    /// Live toasts at `now`, oldest first.
    pub fn toasts(&self, now: DateTime<Utc>) -> Vec<&ToastMessage> {
        self.notifications.active(now)
    }

    /// Drop expired toasts; the surface calls this on its render tick.
    pub fn sweep_toasts(&mut self, now: DateTime<Utc>) {
        self.notifications.purge_expired(now);
    }

    /// Subscribe to ledger changes (the presentation re-render feed).
    pub fn subscribe(&self) -> Subscription<TallyEvent> {
        self.bus.subscribe()
    }

    /// User toggle between standby and armed.
    pub fn toggle_scanning(&mut self) -> SessionState {
        self.session.toggle()
    }

    /// Route one camera signal.
    pub fn handle_signal(&mut self, signal: CameraSignal) -> DomainResult<()> {
        match signal {
            CameraSignal::Decode(event) => self.handle_decode(event),
            CameraSignal::StreamReady(_) => {
                tracing::debug!("camera stream ready");
                Ok(())
            }
            CameraSignal::Error(e) if e.is_fatal() => {
                tracing::error!(error = %e, "camera subsystem failed fatally");
                self.fatal = Some(e);
                Ok(())
            }
            CameraSignal::Error(e) => {
                tracing::warn!(error = %e, "camera subsystem error");
                self.notifications
                    .enqueue(e.to_string(), Severity::Error, Utc::now());
                Ok(())
            }
        }
    }

    /// One raw decode event: debounce, gate, then record.
    pub fn handle_decode(&mut self, event: DecodeEvent) -> DomainResult<()> {
        // The filter runs even in standby so its reference point stays fresh.
        if self.filter.accept(&event) == ScanDisposition::Suppressed {
            return Ok(());
        }
        if !self.session.admit_scan() {
            return Ok(());
        }
        let barcode = Barcode::new(&event.text)?;
        self.dispatch(TallyCommand::scan(barcode, event.observed_at))
    }

    /// Manual barcode entry; feeds the same recording path as camera scans.
    pub fn manual_entry(
        &mut self,
        text: &str,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let barcode = Barcode::new(text)?;
        self.dispatch(TallyCommand::SetQuantity {
            barcode,
            quantity,
            occurred_at: now,
        })
    }

    /// List-view +1.
    pub fn increment(&mut self, barcode: Barcode, now: DateTime<Utc>) -> DomainResult<()> {
        self.dispatch(TallyCommand::Increment {
            barcode,
            occurred_at: now,
        })
    }

    /// List-view -1 (floors at 1).
    pub fn decrement(&mut self, barcode: Barcode, now: DateTime<Utc>) -> DomainResult<()> {
        self.dispatch(TallyCommand::Decrement {
            barcode,
            occurred_at: now,
        })
    }

    /// Delete one entry. No-op unless confirmed.
    pub fn delete(
        &mut self,
        barcode: Barcode,
        confirmation: Confirmation,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if confirmation == Confirmation::Declined {
            return Ok(());
        }
        self.dispatch(TallyCommand::Remove {
            barcode,
            occurred_at: now,
        })
    }

    /// Remove every entry. No-op unless confirmed.
    pub fn clear_all(&mut self, confirmation: Confirmation, now: DateTime<Utc>) -> DomainResult<()> {
        if confirmation == Confirmation::Declined {
            return Ok(());
        }
        self.dispatch(TallyCommand::Clear { occurred_at: now })
    }

    /// Export the current list as CSV.
    pub fn export_csv<W: Write>(&self, writer: W) -> anyhow::Result<()> {
        scantally_store::write_csv(self.ledger.items(), writer)
    }

    pub fn items(&self) -> &[StockItem] {
        self.ledger.items()
    }

    fn dispatch(&mut self, command: TallyCommand) -> DomainResult<()> {
        let events = execute(&mut self.ledger, &command)?;
        if events.is_empty() {
            return Ok(());
        }

        for event in &events {
            if let Some((text, severity)) = toast_for_event(event) {
                self.notifications
                    .enqueue(text, severity, scantally_events::Event::occurred_at(event));
            }
            if self.bus.publish(event.clone()).is_err() {
                tracing::warn!("dropping ledger event; bus unavailable");
            }
        }

        // Full list back to disk on every mutation. A failed save degrades to
        // an in-memory session rather than aborting the mutation.
        if let Err(e) = self.store.save(self.ledger.items()) {
            tracing::warn!(error = %e, "failed to persist item list");
        }
        Ok(())
    }
}
