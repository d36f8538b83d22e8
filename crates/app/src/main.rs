use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use scantally_app::{CameraSignal, Confirmation, ScanPipeline};
use scantally_events::{EventBus, InMemoryEventBus};
use scantally_scan::{DecodeEvent, SessionState};
use scantally_store::{StockFile, export_file_name};

/// Demo surface: drives the pipeline with a synthetic decode feed, the same
/// way tests do, then exports the resulting list.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scantally_observability::init();

    let store = StockFile::new("scantally_items.json");
    let mut pipeline = ScanPipeline::new(store);
    tracing::info!(items = pipeline.items().len(), "loaded saved list");

    let bus: Arc<InMemoryEventBus<CameraSignal>> = Arc::new(InMemoryEventBus::new());
    let signals = bus.subscribe();

    let feed = bus.clone();
    let producer = tokio::spawn(async move {
        for text in ["8690000001", "8690000001", "8690000002"] {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = feed.publish(CameraSignal::Decode(DecodeEvent::new(text, Utc::now())));
        }
    });

    for _ in 0..3 {
        if pipeline.session_state() == SessionState::Standby {
            pipeline.toggle_scanning();
        }
        if let Ok(signal) = signals.recv_timeout(Duration::from_secs(1)) {
            if let Err(e) = pipeline.handle_signal(signal) {
                tracing::warn!(error = %e, "signal rejected");
            }
        }
        pipeline.sweep_toasts(Utc::now());
    }
    producer.await?;

    for item in pipeline.items() {
        println!("{}\t{}", item.barcode, item.quantity);
    }

    let name = export_file_name(Utc::now().date_naive());
    let file = std::fs::File::create(&name)?;
    pipeline.export_csv(file)?;
    tracing::info!(file = %name, "exported");

    // Demo data only; clear so reruns start fresh.
    pipeline.clear_all(Confirmation::Confirmed, Utc::now())?;
    Ok(())
}
