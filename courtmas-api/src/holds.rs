use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use courtmas_booking::{BookingError, ConfirmOutcome, HoldReceipt, HoldStatus};
use courtmas_core::{CustomerDetails, PaymentStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/holds", post(begin_hold))
        .route("/v1/holds/{id}", get(hold_status))
        .route("/v1/holds/{id}", delete(cancel_hold))
        .route("/v1/holds/{id}/payment", post(payment_callback))
}

#[derive(Debug, Deserialize)]
struct BeginHoldRequest {
    court_id: u32,
    date: NaiveDate,
    start_hour: u8,
    duration_hours: u8,
    customer: CustomerDetails,
}

async fn begin_hold(
    State(state): State<AppState>,
    Json(req): Json<BeginHoldRequest>,
) -> Result<Json<HoldReceipt>, AppError> {
    let mut engine = state.engine.lock().await;
    let receipt = engine
        .begin_hold(
            req.court_id,
            req.date,
            req.start_hour,
            req.duration_hours,
            req.customer,
        )
        .await?;
    Ok(Json(receipt))
}

#[derive(Debug, Serialize)]
struct HoldStatusResponse {
    hold_id: Uuid,
    status: String,
    expires_at: DateTime<Utc>,
    /// Seconds left on the payment window; zero once expired.
    remaining_seconds: i64,
}

async fn hold_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HoldStatusResponse>, AppError> {
    let engine = state.engine.lock().await;
    let hold = engine.hold(id).ok_or(BookingError::HoldNotFound(id))?;
    let now = Utc::now();
    // The sweeper may not have ticked yet; the expiry boundary is closed, so
    // an overdue hold must never be reported as HELD.
    let status = if hold.status == HoldStatus::Held && hold.is_expired(now) {
        HoldStatus::Expired
    } else {
        hold.status
    };
    let remaining = (hold.expires_at - now).num_seconds().max(0);
    Ok(Json(HoldStatusResponse {
        hold_id: hold.id,
        status: status.as_str().to_string(),
        expires_at: hold.expires_at,
        remaining_seconds: remaining,
    }))
}

async fn cancel_hold(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut engine = state.engine.lock().await;
    engine.cancel_hold(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct PaymentCallbackRequest {
    status: PaymentStatus,
    reference: Option<String>,
}

async fn payment_callback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PaymentCallbackRequest>,
) -> Result<Json<ConfirmOutcome>, AppError> {
    let mut engine = state.engine.lock().await;
    let outcome = engine
        .confirm_payment(id, req.status, req.reference.as_deref())
        .await?;
    Ok(Json(outcome))
}
