use courtmas_booking::BookingEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

/// Expiry sweep: polls the hold manager on a bounded cadence so overdue
/// holds flip to EXPIRED within a second of their deadline.
pub async fn start_expiry_sweeper(engine: Arc<Mutex<BookingEngine>>, tick: Duration) {
    info!(tick_ms = tick.as_millis() as u64, "expiry sweeper started");
    let mut interval = tokio::time::interval(tick);
    loop {
        interval.tick().await;
        let expired = {
            let mut engine = engine.lock().await;
            engine.sweep_expired().await
        };
        for hold_id in expired {
            info!(%hold_id, "hold expired, slots released to other sessions");
        }
    }
}
