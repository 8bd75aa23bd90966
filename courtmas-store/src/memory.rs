use async_trait::async_trait;
use chrono::NaiveDate;
use courtmas_catalog::SlotId;
use courtmas_core::{
    CacheError, HoldCache, PersistedHold, ReservationRecord, ReservationStore, StoreError,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory reservation store for tests and local runs. Mirrors the
/// Postgres store's contract: all-or-nothing batches, conflicts on the
/// first already-committed slot.
pub struct MemoryReservationStore {
    slots: Mutex<HashMap<(u32, NaiveDate), HashSet<SlotId>>>,
    reservations: Mutex<Vec<ReservationRecord>>,
    unavailable: AtomicBool,
}

impl MemoryReservationStore {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            reservations: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulate a storage outage.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check_up(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn committed_slots(
        &self,
        court_id: u32,
        date: NaiveDate,
    ) -> Result<HashSet<SlotId>, StoreError> {
        self.check_up()?;
        let slots = self.slots.lock().await;
        Ok(slots.get(&(court_id, date)).cloned().unwrap_or_default())
    }

    async fn write_reservation(&self, record: &ReservationRecord) -> Result<Uuid, StoreError> {
        self.check_up()?;
        let mut slots = self.slots.lock().await;
        let entry = slots.entry((record.court_id, record.date)).or_default();

        // Check the whole batch before touching anything.
        if let Some(taken) = record.slot_ids.iter().find(|id| entry.contains(*id)) {
            return Err(StoreError::Conflict((*taken).clone()));
        }
        for id in &record.slot_ids {
            entry.insert(id.clone());
        }
        drop(slots);

        self.reservations.lock().await.push(record.clone());
        Ok(record.id)
    }

    async fn recent_reservations(&self, limit: u32) -> Result<Vec<ReservationRecord>, StoreError> {
        self.check_up()?;
        let reservations = self.reservations.lock().await;
        Ok(reservations
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// In-memory hold cache, keyed by hold id like the file-backed one.
pub struct MemoryHoldCache {
    holds: Mutex<HashMap<Uuid, PersistedHold>>,
}

impl MemoryHoldCache {
    pub fn new() -> Self {
        Self {
            holds: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryHoldCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HoldCache for MemoryHoldCache {
    async fn save(&self, hold: &PersistedHold) -> Result<(), CacheError> {
        self.holds.lock().await.insert(hold.hold_id, hold.clone());
        Ok(())
    }

    async fn remove(&self, hold_id: Uuid) -> Result<(), CacheError> {
        self.holds.lock().await.remove(&hold_id);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<PersistedHold>, CacheError> {
        Ok(self.holds.lock().await.values().cloned().collect())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.holds.lock().await.clear();
        Ok(())
    }
}
