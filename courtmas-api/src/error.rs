use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use courtmas_booking::BookingError;
use serde_json::json;

#[derive(Debug)]
pub struct AppError(pub BookingError);

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            BookingError::InvalidDuration(_) | BookingError::OutOfWindow { .. } => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.0.to_string() }))
            }
            BookingError::CourtNotFound(_) | BookingError::HoldNotFound(_) => {
                (StatusCode::NOT_FOUND, json!({ "error": self.0.to_string() }))
            }
            BookingError::CourtClosed(_)
            | BookingError::SlotUnavailable(_)
            | BookingError::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, json!({ "error": self.0.to_string() }))
            }
            BookingError::HoldExpired(_) => {
                (StatusCode::GONE, json!({ "error": self.0.to_string() }))
            }
            BookingError::Conflict { hold_id, slot_id } => {
                // Money was taken; this must reach operators, not just logs.
                tracing::error!(%hold_id, %slot_id, "payment committed but slot lost, reconciliation needed");
                (
                    StatusCode::CONFLICT,
                    json!({
                        "error": self.0.to_string(),
                        "requires_reconciliation": true,
                    }),
                )
            }
            BookingError::PaymentFailed(msg) => {
                tracing::error!(error = %msg, "payment initiation failed");
                (StatusCode::BAD_GATEWAY, json!({ "error": self.0.to_string() }))
            }
            BookingError::Storage(msg) => {
                tracing::error!(error = %msg, "storage failure surfaced to client");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": self.0.to_string(), "retriable": true }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
