use crate::availability::AvailabilitySnapshot;
use crate::error::BookingError;
use courtmas_catalog::{OperatingWindow, SlotId};
use serde::{Deserialize, Serialize};

/// A contiguous, currently-bookable run of slots with its price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidatedSelection {
    pub court_id: u32,
    pub start_hour: u8,
    pub duration_hours: u8,
    pub slot_ids: Vec<SlotId>,
    pub unit_price_cents: i64,
    pub total_cents: i64,
}

/// Check that `duration_hours` contiguous slots starting at `start_hour` all
/// exist in the grid and are uncommitted. Pure and idempotent for a given
/// snapshot; re-run whenever duration or date change, and again immediately
/// before commit.
pub fn validate(
    start_hour: u8,
    duration_hours: u8,
    unit_price_cents: i64,
    snapshot: &AvailabilitySnapshot,
    window: OperatingWindow,
) -> Result<ValidatedSelection, BookingError> {
    if duration_hours == 0 {
        return Err(BookingError::InvalidDuration(duration_hours));
    }

    let mut slot_ids = Vec::with_capacity(duration_hours as usize);
    for i in 0..duration_hours {
        // Widen before adding; a caller can pass a start hour near u8::MAX.
        let hour = start_hour as u16 + i as u16;
        if hour > window.end_hour as u16 {
            return Err(BookingError::OutOfWindow {
                start_hour,
                duration: duration_hours,
                end_hour: window.end_hour,
            });
        }
        let id = SlotId::new(snapshot.date, hour as u8);
        // Hours before opening never exist in the grid.
        if (hour as u8) < window.start_hour || snapshot.is_committed(&id) {
            return Err(BookingError::SlotUnavailable(id));
        }
        slot_ids.push(id);
    }

    Ok(ValidatedSelection {
        court_id: snapshot.court_id,
        start_hour,
        duration_hours,
        slot_ids,
        unit_price_cents,
        total_cents: unit_price_cents * duration_hours as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use std::collections::HashSet;

    fn window() -> OperatingWindow {
        OperatingWindow::new(8, 23).unwrap()
    }

    fn snapshot(committed_hours: &[u8]) -> AvailabilitySnapshot {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let committed: HashSet<SlotId> = committed_hours
            .iter()
            .map(|&h| SlotId::new(date, h))
            .collect();
        AvailabilitySnapshot {
            court_id: 1,
            date,
            committed,
            degraded: false,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn accepts_free_contiguous_run_and_prices_it() {
        let snap = snapshot(&[]);
        let sel = validate(14, 2, 2000, &snap, window()).unwrap();

        assert_eq!(sel.slot_ids.len(), 2);
        assert_eq!(sel.slot_ids[0].as_str(), "2026-03-14-14");
        assert_eq!(sel.slot_ids[1].as_str(), "2026-03-14-15");
        assert_eq!(sel.total_cents, 4000);
    }

    #[test]
    fn rejects_run_past_closing() {
        // 22, 23, 24 -- hour 24 does not exist.
        let snap = snapshot(&[]);
        let err = validate(22, 3, 2000, &snap, window()).unwrap_err();
        assert!(matches!(err, BookingError::OutOfWindow { .. }));
    }

    #[test]
    fn rejects_overlap_with_committed_slot() {
        // Hour 10 is taken, so a 2-hour block from 9 cannot fit.
        let snap = snapshot(&[10]);
        let err = validate(9, 2, 2000, &snap, window()).unwrap_err();
        match err {
            BookingError::SlotUnavailable(id) => assert_eq!(id.as_str(), "2026-03-14-10"),
            other => panic!("expected SlotUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn rejects_start_before_opening() {
        let snap = snapshot(&[]);
        let err = validate(6, 1, 2000, &snap, window()).unwrap_err();
        assert!(matches!(err, BookingError::SlotUnavailable(_)));
    }

    #[test]
    fn rejects_zero_duration() {
        let snap = snapshot(&[]);
        let err = validate(14, 0, 2000, &snap, window()).unwrap_err();
        assert!(matches!(err, BookingError::InvalidDuration(0)));
    }

    #[test]
    fn idempotent_for_unchanged_inputs() {
        let snap = snapshot(&[12]);
        let first = validate(14, 3, 1500, &snap, window());
        let second = validate(14, 3, 1500, &snap, window());
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn exact_fit_at_closing_hour_is_accepted() {
        // 21, 22, 23 ends exactly at the last bookable hour.
        let snap = snapshot(&[]);
        let sel = validate(21, 3, 2000, &snap, window()).unwrap();
        assert_eq!(sel.slot_ids.last().unwrap().as_str(), "2026-03-14-23");
    }
}
