use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use courtmas_booking::{SlotBoard, ValidatedSelection};
use courtmas_catalog::Court;
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/courts", get(list_courts))
        .route("/v1/courts/{id}/slots", get(court_slots))
        .route("/v1/courts/{id}/validate", post(validate_selection))
}

async fn list_courts(State(state): State<AppState>) -> Json<Vec<Court>> {
    let engine = state.engine.lock().await;
    let courts = engine.catalog().list().into_iter().cloned().collect();
    Json(courts)
}

#[derive(Debug, Deserialize)]
struct SlotsQuery {
    date: NaiveDate,
}

async fn court_slots(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotBoard>, AppError> {
    let engine = state.engine.lock().await;
    let board = engine.slots(id, query.date).await?;
    Ok(Json(board))
}

#[derive(Debug, Deserialize)]
struct ValidateRequest {
    date: NaiveDate,
    start_hour: u8,
    duration_hours: u8,
}

async fn validate_selection(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidatedSelection>, AppError> {
    let engine = state.engine.lock().await;
    let selection = engine
        .validate_selection(id, req.date, req.start_hour, req.duration_hours)
        .await?;
    Ok(Json(selection))
}
