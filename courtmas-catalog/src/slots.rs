use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range of bookable start hours, e.g. 8..=23 for a hall open
/// from 8 AM with the last playable hour starting at 11 PM.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatingWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl OperatingWindow {
    pub fn new(start_hour: u8, end_hour: u8) -> Result<Self, WindowError> {
        if end_hour > 23 || start_hour > end_hour {
            return Err(WindowError::Invalid {
                start_hour,
                end_hour,
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn contains(&self, hour: u8) -> bool {
        hour >= self.start_hour && hour <= self.end_hour
    }

    /// Number of hourly slots the window produces.
    pub fn slot_count(&self) -> usize {
        (self.end_hour - self.start_hour) as usize + 1
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("invalid operating window {start_hour}..={end_hour}")]
    Invalid { start_hour: u8, end_hour: u8 },
}

/// Stable slot identity, derived from date and hour.
///
/// The same `(date, hour)` always yields the same id across processes and
/// restarts, so committed reservations can be matched against freshly
/// generated grids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(String);

impl SlotId {
    pub fn new(date: NaiveDate, hour: u8) -> Self {
        Self(format!("{}-{}", date.format("%Y-%m-%d"), hour))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SlotId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One bookable hour of one court on one date.
///
/// Slots are computed views, not persisted objects; `committed` is overlaid
/// from the availability index by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub date: NaiveDate,
    pub hour: u8,
    pub committed: bool,
}

/// Generate the canonical slot grid for a date, one slot per hour in
/// ascending order. Pure function of its inputs; re-invoke when the date
/// changes.
pub fn generate_slots(date: NaiveDate, window: OperatingWindow) -> Vec<Slot> {
    (window.start_hour..=window.end_hour)
        .map(|hour| Slot {
            id: SlotId::new(date, hour),
            date,
            hour,
            committed: false,
        })
        .collect()
}
