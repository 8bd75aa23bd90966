use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use courtmas_booking::BookingError;
use courtmas_core::ReservationRecord;
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/bookings", get(recent_bookings))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u32>,
}

async fn recent_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ReservationRecord>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(state.admin_listing_limit)
        .min(state.admin_listing_limit);
    let records = state
        .store
        .recent_reservations(limit)
        .await
        .map_err(BookingError::storage)?;
    Ok(Json(records))
}
