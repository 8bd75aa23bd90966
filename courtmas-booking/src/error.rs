use courtmas_catalog::{CourtError, SlotId};
use courtmas_core::StoreError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("duration must be at least one hour")]
    InvalidDuration(u8),

    #[error("a {duration} hour booking starting at {start_hour}:00 runs past closing ({end_hour}:00)")]
    OutOfWindow {
        start_hour: u8,
        duration: u8,
        end_hour: u8,
    },

    #[error("slot {0} is not available")]
    SlotUnavailable(SlotId),

    #[error("court not found: {0}")]
    CourtNotFound(u32),

    #[error("court {0} is closed for booking")]
    CourtClosed(u32),

    #[error("hold not found: {0}")]
    HoldNotFound(Uuid),

    #[error("hold {0} has expired")]
    HoldExpired(Uuid),

    #[error("invalid hold transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("payment could not be initiated: {0}")]
    PaymentFailed(String),

    /// Payment succeeded but the slots were lost to a concurrent commit.
    /// Requires manual reconciliation; never swallow this.
    #[error("hold {hold_id}: slot {slot_id} was committed by another session; payment needs reconciliation")]
    Conflict { hold_id: Uuid, slot_id: SlotId },

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<CourtError> for BookingError {
    fn from(e: CourtError) -> Self {
        match e {
            CourtError::NotFound(id) => Self::CourtNotFound(id),
            CourtError::Closed(id) => Self::CourtClosed(id),
        }
    }
}

impl BookingError {
    /// Lift a store error outside the conflict path, where `Conflict`
    /// carries no hold context yet.
    pub fn storage(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(slot_id) => Self::SlotUnavailable(slot_id),
            StoreError::Unavailable(msg) => Self::Storage(msg),
        }
    }
}
