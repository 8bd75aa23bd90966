use crate::reservation::ReservationRecord;
use async_trait::async_trait;
use chrono::NaiveDate;
use courtmas_catalog::SlotId;
use std::collections::HashSet;
use uuid::Uuid;

/// Failures crossing the durable-store boundary. `Conflict` is permanent for
/// the slot in question; `Unavailable` is transient and retriable.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("slot already committed: {0}")]
    Conflict(SlotId),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// The single authoritative store for committed reservations.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Slot ids already committed for a court and date. Held-but-unpaid
    /// reservations never appear here.
    async fn committed_slots(
        &self,
        court_id: u32,
        date: NaiveDate,
    ) -> Result<HashSet<SlotId>, StoreError>;

    /// Durably write one reservation. All slots land in a single
    /// all-or-nothing batch; a uniqueness violation on any slot fails the
    /// whole write with `Conflict`.
    async fn write_reservation(&self, record: &ReservationRecord) -> Result<Uuid, StoreError>;

    /// Most recent committed reservations, newest first.
    async fn recent_reservations(&self, limit: u32) -> Result<Vec<ReservationRecord>, StoreError>;
}
