pub mod cache;
pub mod payment;
pub mod repository;
pub mod reservation;

pub use cache::{CacheError, HoldCache, PersistedHold};
pub use payment::{PaymentError, PaymentProvider, PaymentRedirect, PaymentStatus};
pub use repository::{ReservationStore, StoreError};
pub use reservation::{CustomerDetails, ReservationDraft, ReservationRecord};
