use chrono::{DateTime, NaiveDate, Utc};
use courtmas_catalog::SlotId;
use courtmas_core::ReservationStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Committed slots for one court and date, as seen at `fetched_at`.
///
/// Holds placed by other sessions are deliberately invisible here; the commit
/// writer's critical section is what resolves the resulting race.
#[derive(Debug, Clone)]
pub struct AvailabilitySnapshot {
    pub court_id: u32,
    pub date: NaiveDate,
    pub committed: HashSet<SlotId>,
    /// True when storage was unreachable and the set degraded to empty.
    /// Callers must surface this rather than presenting a fully open grid
    /// as authoritative.
    pub degraded: bool,
    pub fetched_at: DateTime<Utc>,
}

impl AvailabilitySnapshot {
    pub fn is_committed(&self, id: &SlotId) -> bool {
        self.committed.contains(id)
    }
}

/// Read side of the committed-reservation store.
pub struct AvailabilityIndex {
    store: Arc<dyn ReservationStore>,
}

impl AvailabilityIndex {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    /// Fetch the committed set. Storage failure degrades to an empty set
    /// with `degraded` set, so the caller's UI keeps working.
    pub async fn fetch(&self, court_id: u32, date: NaiveDate) -> AvailabilitySnapshot {
        match self.store.committed_slots(court_id, date).await {
            Ok(committed) => AvailabilitySnapshot {
                court_id,
                date,
                committed,
                degraded: false,
                fetched_at: Utc::now(),
            },
            Err(e) => {
                warn!(court_id, %date, error = %e, "availability fetch failed, degrading to empty index");
                AvailabilitySnapshot {
                    court_id,
                    date,
                    committed: HashSet::new(),
                    degraded: true,
                    fetched_at: Utc::now(),
                }
            }
        }
    }
}
