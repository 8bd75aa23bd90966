use courtmas_booking::BookingEngine;
use courtmas_core::ReservationStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    /// The booking engine owns mutable session state (holds), so the API
    /// serializes access through one lock.
    pub engine: Arc<Mutex<BookingEngine>>,
    /// Read-only handle for the admin listing.
    pub store: Arc<dyn ReservationStore>,
    pub admin_listing_limit: u32,
}
