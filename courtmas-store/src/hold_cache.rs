use async_trait::async_trait;
use courtmas_core::{CacheError, HoldCache, PersistedHold};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// JSON-file hold cache. One file next to the process holds a map of every
/// in-flight hold, keyed by hold id, so a restart can resume each countdown
/// and payment callback without one customer's hold clobbering another's.
pub struct FileHoldCache {
    path: PathBuf,
}

impl FileHoldCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_map(&self) -> Result<HashMap<Uuid, PersistedHold>, CacheError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(CacheError::Io(e.to_string())),
        };
        serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt(e.to_string()))
    }

    async fn write_map(&self, map: &HashMap<Uuid, PersistedHold>) -> Result<(), CacheError> {
        if map.is_empty() {
            return self.clear().await;
        }
        let payload =
            serde_json::to_vec_pretty(map).map_err(|e| CacheError::Corrupt(e.to_string()))?;
        tokio::fs::write(&self.path, payload)
            .await
            .map_err(|e| CacheError::Io(e.to_string()))
    }
}

#[async_trait]
impl HoldCache for FileHoldCache {
    async fn save(&self, hold: &PersistedHold) -> Result<(), CacheError> {
        let mut map = self.read_map().await?;
        map.insert(hold.hold_id, hold.clone());
        self.write_map(&map).await?;
        debug!(path = %self.path.display(), hold_id = %hold.hold_id, "hold cached");
        Ok(())
    }

    async fn remove(&self, hold_id: Uuid) -> Result<(), CacheError> {
        let mut map = self.read_map().await?;
        if map.remove(&hold_id).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<PersistedHold>, CacheError> {
        Ok(self.read_map().await?.into_values().collect())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use courtmas_catalog::SlotId;
    use courtmas_core::{CustomerDetails, ReservationDraft};
    use uuid::Uuid;

    fn persisted() -> PersistedHold {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        PersistedHold {
            hold_id: Uuid::new_v4(),
            draft: ReservationDraft {
                court_id: 1,
                date,
                start_hour: 14,
                duration_hours: 1,
                slot_ids: vec![SlotId::new(date, 14)],
                unit_price_cents: 2000,
                total_cents: 2000,
                customer: CustomerDetails {
                    name: "Aina".to_string(),
                    email: "aina@example.com".to_string(),
                    phone: "012-3456789".to_string(),
                },
                created_at: Utc::now(),
            },
            expires_at: Utc::now() + Duration::minutes(15),
            bill_code: Some("bill-1".to_string()),
        }
    }

    #[tokio::test]
    async fn round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileHoldCache::new(dir.path().join("hold.json"));

        assert!(cache.load_all().await.unwrap().is_empty());

        let hold = persisted();
        cache.save(&hold).await.unwrap();
        let loaded = cache.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].hold_id, hold.hold_id);
        assert_eq!(loaded[0].expires_at, hold.expires_at);

        cache.clear().await.unwrap();
        assert!(cache.load_all().await.unwrap().is_empty());
        // Clearing twice is fine.
        cache.clear().await.unwrap();
    }

    #[tokio::test]
    async fn entries_are_independent_per_hold() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileHoldCache::new(dir.path().join("hold.json"));

        let first = persisted();
        let second = persisted();
        cache.save(&first).await.unwrap();
        cache.save(&second).await.unwrap();
        assert_eq!(cache.load_all().await.unwrap().len(), 2);

        // Removing one hold leaves the other's payload intact.
        cache.remove(first.hold_id).await.unwrap();
        let remaining = cache.load_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].hold_id, second.hold_id);

        // Removing an absent id is a no-op.
        cache.remove(first.hold_id).await.unwrap();
        assert_eq!(cache.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_payload_is_reported_not_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hold.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let cache = FileHoldCache::new(path);
        assert!(matches!(cache.load_all().await, Err(CacheError::Corrupt(_))));
    }
}
