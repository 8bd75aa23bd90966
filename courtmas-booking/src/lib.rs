pub mod availability;
pub mod commit;
pub mod engine;
pub mod error;
pub mod hold;
pub mod validator;

pub use availability::{AvailabilityIndex, AvailabilitySnapshot};
pub use commit::CommitWriter;
pub use engine::{BookingEngine, ConfirmOutcome, HoldReceipt, SlotBoard};
pub use error::BookingError;
pub use hold::{Hold, HoldManager, HoldStatus};
pub use validator::{validate, ValidatedSelection};
