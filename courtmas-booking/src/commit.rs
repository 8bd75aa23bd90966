use crate::error::BookingError;
use courtmas_core::{ReservationRecord, ReservationStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

/// Serializes every commit attempt through one critical section and performs
/// a final availability re-check while it is held, so concurrent commits for
/// overlapping slots can never both succeed. The store's uniqueness
/// constraint backstops the same guarantee across processes.
pub struct CommitWriter {
    store: Arc<dyn ReservationStore>,
    lock: Mutex<()>,
    lock_timeout: Duration,
}

impl CommitWriter {
    pub fn new(store: Arc<dyn ReservationStore>, lock_timeout: Duration) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
            lock_timeout,
        }
    }

    /// Durably write `record`, all slots in one batch. Fails with a
    /// retriable storage error if the critical section cannot be acquired
    /// within the bounded wait.
    pub async fn commit(&self, hold_id: Uuid, record: &ReservationRecord) -> Result<Uuid, BookingError> {
        let _guard = tokio::time::timeout(self.lock_timeout, self.lock.lock())
            .await
            .map_err(|_| {
                BookingError::Storage("commit lock not acquired within bounded wait".to_string())
            })?;

        // Final re-check inside the critical section. Degrading to an empty
        // set is not acceptable on the write path, so a read failure aborts.
        let committed = self
            .store
            .committed_slots(record.court_id, record.date)
            .await
            .map_err(|e| match e {
                StoreError::Unavailable(msg) => BookingError::Storage(msg),
                StoreError::Conflict(slot_id) => BookingError::Conflict { hold_id, slot_id },
            })?;

        if let Some(taken) = record.slot_ids.iter().find(|id| committed.contains(*id)) {
            error!(%hold_id, slot_id = %taken, "commit lost the race, flagging for reconciliation");
            return Err(BookingError::Conflict {
                hold_id,
                slot_id: taken.clone(),
            });
        }

        match self.store.write_reservation(record).await {
            Ok(id) => {
                info!(%hold_id, reservation_id = %id, slots = record.slot_ids.len(), "reservation committed");
                Ok(id)
            }
            Err(StoreError::Conflict(slot_id)) => {
                error!(%hold_id, %slot_id, "store rejected commit on uniqueness, flagging for reconciliation");
                Err(BookingError::Conflict { hold_id, slot_id })
            }
            Err(StoreError::Unavailable(msg)) => Err(BookingError::Storage(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use courtmas_catalog::SlotId;
    use courtmas_core::{CustomerDetails, ReservationDraft};
    use courtmas_store::memory::MemoryReservationStore;

    fn record(hours: &[u8]) -> ReservationRecord {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let draft = ReservationDraft {
            court_id: 1,
            date,
            start_hour: hours[0],
            duration_hours: hours.len() as u8,
            slot_ids: hours.iter().map(|&h| SlotId::new(date, h)).collect(),
            unit_price_cents: 2000,
            total_cents: 2000 * hours.len() as i64,
            customer: CustomerDetails {
                name: "Aina".to_string(),
                email: "aina@example.com".to_string(),
                phone: "012-3456789".to_string(),
            },
            created_at: Utc::now(),
        };
        ReservationRecord::from_draft(&draft, None)
    }

    #[tokio::test]
    async fn overlapping_commits_yield_exactly_one_success() {
        let store = Arc::new(MemoryReservationStore::new());
        let writer = Arc::new(CommitWriter::new(store, Duration::from_secs(10)));

        let a = record(&[14, 15]);
        let b = record(&[15, 16]);

        let wa = writer.clone();
        let wb = writer.clone();
        let ha = tokio::spawn(async move { wa.commit(Uuid::new_v4(), &a).await });
        let hb = tokio::spawn(async move { wb.commit(Uuid::new_v4(), &b).await });

        let ra = ha.await.unwrap();
        let rb = hb.await.unwrap();

        let successes = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let loser = if ra.is_ok() { rb } else { ra };
        assert!(matches!(loser.unwrap_err(), BookingError::Conflict { .. }));
    }

    #[tokio::test]
    async fn disjoint_commits_both_succeed() {
        let store = Arc::new(MemoryReservationStore::new());
        let writer = CommitWriter::new(store.clone(), Duration::from_secs(10));

        writer.commit(Uuid::new_v4(), &record(&[8, 9])).await.unwrap();
        writer.commit(Uuid::new_v4(), &record(&[10, 11])).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let committed = store.committed_slots(1, date).await.unwrap();
        assert_eq!(committed.len(), 4);
    }

    #[tokio::test]
    async fn partial_overlap_leaves_no_partial_write() {
        let store = Arc::new(MemoryReservationStore::new());
        let writer = CommitWriter::new(store.clone(), Duration::from_secs(10));

        writer.commit(Uuid::new_v4(), &record(&[12])).await.unwrap();
        let err = writer.commit(Uuid::new_v4(), &record(&[11, 12])).await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict { .. }));

        // Hour 11 must not have been booked by the failed attempt.
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let committed = store.committed_slots(1, date).await.unwrap();
        assert_eq!(committed.len(), 1);
        assert!(committed.contains(&SlotId::new(date, 12)));
    }

    #[tokio::test]
    async fn storage_outage_is_retriable_not_conflict() {
        let store = Arc::new(MemoryReservationStore::new());
        store.set_unavailable(true);
        let writer = CommitWriter::new(store, Duration::from_secs(10));

        let err = writer.commit(Uuid::new_v4(), &record(&[14])).await.unwrap_err();
        assert!(matches!(err, BookingError::Storage(_)));
    }
}
