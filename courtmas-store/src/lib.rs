pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod hold_cache;
pub mod memory;

pub use booking_repo::PgReservationStore;
pub use database::DbClient;
pub use hold_cache::FileHoldCache;
pub use memory::{MemoryHoldCache, MemoryReservationStore};
