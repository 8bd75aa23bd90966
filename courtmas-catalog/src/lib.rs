pub mod court;
pub mod pricing;
pub mod slots;

pub use court::{Court, CourtCatalog, CourtError, Sport};
pub use pricing::{quote, Quote};
pub use slots::{generate_slots, OperatingWindow, Slot, SlotId};
