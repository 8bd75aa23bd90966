use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sport {
    Badminton,
    Futsal,
    Pickleball,
}

/// A bookable court.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Court {
    pub id: u32,
    pub name: String,
    /// Surface type, e.g. "Rubber", "Parquet".
    pub surface: String,
    pub sport: Sport,
    pub price_per_hour_cents: i64,
    pub is_available: bool,
}

/// In-memory court registry.
pub struct CourtCatalog {
    courts: HashMap<u32, Court>,
}

impl CourtCatalog {
    pub fn new() -> Self {
        Self {
            courts: HashMap::new(),
        }
    }

    pub fn insert(&mut self, court: Court) {
        self.courts.insert(court.id, court);
    }

    pub fn get(&self, id: u32) -> Option<&Court> {
        self.courts.get(&id)
    }

    /// A court must exist and be open to take bookings.
    pub fn bookable(&self, id: u32) -> Result<&Court, CourtError> {
        let court = self.courts.get(&id).ok_or(CourtError::NotFound(id))?;
        if !court.is_available {
            return Err(CourtError::Closed(id));
        }
        Ok(court)
    }

    /// Courts ordered by id, for listing.
    pub fn list(&self) -> Vec<&Court> {
        let mut all: Vec<&Court> = self.courts.values().collect();
        all.sort_by_key(|c| c.id);
        all
    }

    pub fn set_price(&mut self, id: u32, price_per_hour_cents: i64) -> Result<(), CourtError> {
        let court = self.courts.get_mut(&id).ok_or(CourtError::NotFound(id))?;
        court.price_per_hour_cents = price_per_hour_cents;
        Ok(())
    }

    pub fn set_available(&mut self, id: u32, is_available: bool) -> Result<(), CourtError> {
        let court = self.courts.get_mut(&id).ok_or(CourtError::NotFound(id))?;
        court.is_available = is_available;
        Ok(())
    }
}

impl Default for CourtCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CourtError {
    #[error("court not found: {0}")]
    NotFound(u32),

    #[error("court {0} is closed for booking")]
    Closed(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: u32, open: bool) -> Court {
        Court {
            id,
            name: format!("Court {}", id),
            surface: "Rubber".to_string(),
            sport: Sport::Badminton,
            price_per_hour_cents: 2000,
            is_available: open,
        }
    }

    #[test]
    fn bookable_requires_open_court() {
        let mut catalog = CourtCatalog::new();
        catalog.insert(sample(1, true));
        catalog.insert(sample(2, false));

        assert!(catalog.bookable(1).is_ok());
        assert!(matches!(catalog.bookable(2), Err(CourtError::Closed(2))));
        assert!(matches!(catalog.bookable(9), Err(CourtError::NotFound(9))));
    }

    #[test]
    fn list_is_ordered_by_id() {
        let mut catalog = CourtCatalog::new();
        catalog.insert(sample(3, true));
        catalog.insert(sample(1, true));
        catalog.insert(sample(2, true));

        let ids: Vec<u32> = catalog.list().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn admin_updates_apply() {
        let mut catalog = CourtCatalog::new();
        catalog.insert(sample(1, true));

        catalog.set_price(1, 1500).unwrap();
        catalog.set_available(1, false).unwrap();

        let court = catalog.get(1).unwrap();
        assert_eq!(court.price_per_hour_cents, 1500);
        assert!(!court.is_available);
    }
}
