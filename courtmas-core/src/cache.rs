use crate::reservation::ReservationDraft;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of an in-progress hold, durable across process restarts and
/// payment-provider redirects so the countdown and callback can resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedHold {
    pub hold_id: Uuid,
    pub draft: ReservationDraft,
    pub expires_at: DateTime<Utc>,
    pub bill_code: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("hold cache io error: {0}")]
    Io(String),

    #[error("hold cache payload unreadable: {0}")]
    Corrupt(String),
}

/// Durable cache of this process's in-flight holds, keyed by hold id, so a
/// restart can resume every live countdown independently.
#[async_trait]
pub trait HoldCache: Send + Sync {
    /// Insert or replace the entry for `hold.hold_id`. Other entries are
    /// untouched.
    async fn save(&self, hold: &PersistedHold) -> Result<(), CacheError>;

    /// Drop one entry. Removing an absent id is not an error.
    async fn remove(&self, hold_id: Uuid) -> Result<(), CacheError>;

    async fn load_all(&self) -> Result<Vec<PersistedHold>, CacheError>;

    /// Wipe everything, including payloads that no longer parse.
    async fn clear(&self) -> Result<(), CacheError>;
}
