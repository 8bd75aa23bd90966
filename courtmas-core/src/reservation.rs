use chrono::{DateTime, NaiveDate, Utc};
use courtmas_catalog::SlotId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A candidate reservation: validated slot selection plus customer details,
/// not yet durable. Invariants (enforced by the validator, relied on here):
/// `slot_ids.len() == duration_hours`, all slots share `date` and `court_id`,
/// hours are strictly consecutive, none committed at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDraft {
    pub court_id: u32,
    pub date: NaiveDate,
    pub start_hour: u8,
    pub duration_hours: u8,
    pub slot_ids: Vec<SlotId>,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub customer: CustomerDetails,
    pub created_at: DateTime<Utc>,
}

/// A committed reservation as persisted by the store. Created exactly once
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: Uuid,
    pub court_id: u32,
    pub date: NaiveDate,
    pub start_hour: u8,
    pub duration_hours: u8,
    pub slot_ids: Vec<SlotId>,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub customer: CustomerDetails,
    /// External payment reference, when the provider supplied one.
    pub bill_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReservationRecord {
    pub fn from_draft(draft: &ReservationDraft, bill_code: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            court_id: draft.court_id,
            date: draft.date,
            start_hour: draft.start_hour,
            duration_hours: draft.duration_hours,
            slot_ids: draft.slot_ids.clone(),
            unit_price_cents: draft.unit_price_cents,
            total_cents: draft.total_cents,
            customer: draft.customer.clone(),
            bill_code,
            created_at: draft.created_at,
        }
    }
}
