use crate::reservation::CustomerDetails;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Definitive and non-definitive payment outcomes reported by the provider's
/// return callback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Success,
    Failed,
    Pending,
}

/// Where to send the customer to complete payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRedirect {
    pub url: String,
    /// Provider-side bill reference, kept on the committed reservation.
    pub bill_code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment provider error: {0}")]
    Provider(String),

    #[error("payment request rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a bill for the given amount, tied to the hold via `reference`.
    /// The provider reports the eventual status asynchronously through the
    /// return callback.
    async fn initiate(
        &self,
        amount_cents: i64,
        reference: Uuid,
        customer: &CustomerDetails,
    ) -> Result<PaymentRedirect, PaymentError>;
}

/// Provider stub for tests and local development.
pub struct MockPaymentProvider;

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn initiate(
        &self,
        amount_cents: i64,
        reference: Uuid,
        _customer: &CustomerDetails,
    ) -> Result<PaymentRedirect, PaymentError> {
        if amount_cents <= 0 {
            return Err(PaymentError::Rejected("non-positive amount".to_string()));
        }
        let bill_code = format!("mock-bill-{}", reference.simple());
        Ok(PaymentRedirect {
            url: format!("https://pay.invalid/{}", bill_code),
            bill_code,
        })
    }
}
