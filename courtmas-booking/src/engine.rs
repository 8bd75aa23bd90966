use crate::availability::AvailabilityIndex;
use crate::commit::CommitWriter;
use crate::error::BookingError;
use crate::hold::{Hold, HoldManager, HoldStatus};
use crate::validator::{validate, ValidatedSelection};
use chrono::{DateTime, NaiveDate, Utc};
use courtmas_catalog::{generate_slots, CourtCatalog, OperatingWindow, Slot};
use courtmas_core::{
    CustomerDetails, HoldCache, PaymentProvider, PaymentStatus, ReservationDraft,
    ReservationRecord, ReservationStore,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

/// Slot grid for one court and date, with availability overlaid.
#[derive(Debug, Clone, Serialize)]
pub struct SlotBoard {
    pub court_id: u32,
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
    /// Availability could not be read; the grid shows everything open but
    /// must not be presented as authoritative.
    pub degraded: bool,
}

/// Everything the customer needs to pay for a fresh hold.
#[derive(Debug, Clone, Serialize)]
pub struct HoldReceipt {
    pub hold_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub total_cents: i64,
    pub payment_url: String,
    pub bill_code: String,
}

/// Outcome of a payment callback.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "outcome")]
pub enum ConfirmOutcome {
    Committed { reservation_id: Uuid },
    /// Provider has not reached a definitive status; the hold stays live
    /// until its TTL runs out or a later callback settles it.
    Pending,
    /// Declined or cancelled at the provider; the hold is released.
    Cancelled,
}

/// One booking session's engine: ties the grid, the availability index, the
/// hold state machine and the commit writer together behind the operations
/// the UI layer calls.
pub struct BookingEngine {
    catalog: CourtCatalog,
    window: OperatingWindow,
    availability: AvailabilityIndex,
    holds: HoldManager,
    committer: CommitWriter,
    payments: Arc<dyn PaymentProvider>,
    cache: Arc<dyn HoldCache>,
    expiry_tx: broadcast::Sender<Uuid>,
}

impl BookingEngine {
    pub fn new(
        catalog: CourtCatalog,
        window: OperatingWindow,
        store: Arc<dyn ReservationStore>,
        payments: Arc<dyn PaymentProvider>,
        cache: Arc<dyn HoldCache>,
        hold_ttl: chrono::Duration,
        commit_lock_timeout: StdDuration,
    ) -> Self {
        let (expiry_tx, _) = broadcast::channel(64);
        Self {
            catalog,
            window,
            availability: AvailabilityIndex::new(store.clone()),
            holds: HoldManager::new(hold_ttl),
            committer: CommitWriter::new(store, commit_lock_timeout),
            payments,
            cache,
            expiry_tx,
        }
    }

    pub fn catalog(&self) -> &CourtCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut CourtCatalog {
        &mut self.catalog
    }

    pub fn window(&self) -> OperatingWindow {
        self.window
    }

    pub fn hold(&self, id: Uuid) -> Option<&Hold> {
        self.holds.get(id)
    }

    /// Subscribe to hold-expiry notifications from the sweep.
    pub fn subscribe_expiry(&self) -> broadcast::Receiver<Uuid> {
        self.expiry_tx.subscribe()
    }

    /// The canonical grid for a date with committed slots marked.
    pub async fn slots(&self, court_id: u32, date: NaiveDate) -> Result<SlotBoard, BookingError> {
        self.catalog.bookable(court_id)?;
        let snapshot = self.availability.fetch(court_id, date).await;
        let mut slots = generate_slots(date, self.window);
        for slot in &mut slots {
            slot.committed = snapshot.is_committed(&slot.id);
        }
        Ok(SlotBoard {
            court_id,
            date,
            slots,
            degraded: snapshot.degraded,
        })
    }

    /// Validate a selection and quote it, without holding anything.
    pub async fn validate_selection(
        &self,
        court_id: u32,
        date: NaiveDate,
        start_hour: u8,
        duration_hours: u8,
    ) -> Result<ValidatedSelection, BookingError> {
        let court = self.catalog.bookable(court_id)?;
        let unit_price = court.price_per_hour_cents;
        let snapshot = self.availability.fetch(court_id, date).await;
        validate(start_hour, duration_hours, unit_price, &snapshot, self.window)
    }

    /// Validate, place the hold, persist it for recovery, and open the
    /// payment flow. Any edit to slot, duration or date afterwards must go
    /// through cancel + a fresh hold.
    pub async fn begin_hold(
        &mut self,
        court_id: u32,
        date: NaiveDate,
        start_hour: u8,
        duration_hours: u8,
        customer: CustomerDetails,
    ) -> Result<HoldReceipt, BookingError> {
        let selection = self
            .validate_selection(court_id, date, start_hour, duration_hours)
            .await?;

        let now = Utc::now();
        let draft = ReservationDraft {
            court_id,
            date,
            start_hour: selection.start_hour,
            duration_hours: selection.duration_hours,
            slot_ids: selection.slot_ids,
            unit_price_cents: selection.unit_price_cents,
            total_cents: selection.total_cents,
            customer,
            created_at: now,
        };

        let hold = self.holds.begin(draft, now);

        let redirect = match self
            .payments
            .initiate(hold.draft.total_cents, hold.id, &hold.draft.customer)
            .await
        {
            Ok(redirect) => redirect,
            Err(e) => {
                // Nothing durable happened; release the hold entirely.
                let _ = self.holds.cancel(hold.id, now);
                return Err(BookingError::PaymentFailed(e.to_string()));
            }
        };

        self.holds.set_bill_code(hold.id, redirect.bill_code.clone())?;
        self.persist_hold(hold.id).await;

        Ok(HoldReceipt {
            hold_id: hold.id,
            expires_at: hold.expires_at,
            total_cents: hold.draft.total_cents,
            payment_url: redirect.url,
            bill_code: redirect.bill_code,
        })
    }

    /// Customer backs out before paying. Synchronous, no durable effect.
    pub async fn cancel_hold(&mut self, hold_id: Uuid) -> Result<(), BookingError> {
        self.holds.cancel(hold_id, Utc::now())?;
        self.drop_cached(hold_id).await;
        Ok(())
    }

    /// Handle the provider's status callback for a hold.
    pub async fn confirm_payment(
        &mut self,
        hold_id: Uuid,
        status: PaymentStatus,
        reference: Option<&str>,
    ) -> Result<ConfirmOutcome, BookingError> {
        if self.holds.get(hold_id).is_none() {
            return Err(BookingError::HoldNotFound(hold_id));
        }
        match status {
            PaymentStatus::Pending => Ok(ConfirmOutcome::Pending),
            PaymentStatus::Failed => {
                self.holds.cancel(hold_id, Utc::now())?;
                self.drop_cached(hold_id).await;
                Ok(ConfirmOutcome::Cancelled)
            }
            PaymentStatus::Success => self.commit_hold(hold_id, reference).await,
        }
    }

    async fn commit_hold(
        &mut self,
        hold_id: Uuid,
        reference: Option<&str>,
    ) -> Result<ConfirmOutcome, BookingError> {
        let now = Utc::now();
        let hold = self.holds.get(hold_id).ok_or(BookingError::HoldNotFound(hold_id))?;

        if hold.status != HoldStatus::Held {
            return Err(BookingError::InvalidTransition {
                from: hold.status.as_str().to_string(),
                to: HoldStatus::Committed.as_str().to_string(),
            });
        }
        if hold.is_expired(now) {
            // Close the boundary before anything durable happens.
            let _ = self.holds.expire_due(now);
            self.drop_cached(hold_id).await;
            return Err(BookingError::HoldExpired(hold_id));
        }

        let draft = hold.draft.clone();
        let bill_code = reference
            .map(str::to_string)
            .or_else(|| hold.bill_code.clone());

        // Re-validate against the current index: the committed set may have
        // changed during the hold window. A degraded snapshot is a retriable
        // storage failure here, never a green light.
        let snapshot = self.availability.fetch(draft.court_id, draft.date).await;
        if snapshot.degraded {
            return Err(BookingError::Storage(
                "availability unreadable during commit".to_string(),
            ));
        }
        if let Err(e) = validate(
            draft.start_hour,
            draft.duration_hours,
            draft.unit_price_cents,
            &snapshot,
            self.window,
        ) {
            return match e {
                BookingError::SlotUnavailable(slot_id) => {
                    warn!(%hold_id, %slot_id, "re-validation failed after successful payment");
                    self.holds.mark_conflict(hold_id, Utc::now())?;
                    self.drop_cached(hold_id).await;
                    Err(BookingError::Conflict { hold_id, slot_id })
                }
                other => Err(other),
            };
        }

        let record = ReservationRecord::from_draft(&draft, bill_code);
        match self.committer.commit(hold_id, &record).await {
            Ok(reservation_id) => {
                self.holds.mark_committed(hold_id, Utc::now())?;
                self.drop_cached(hold_id).await;
                Ok(ConfirmOutcome::Committed { reservation_id })
            }
            Err(BookingError::Conflict { hold_id, slot_id }) => {
                self.holds.mark_conflict(hold_id, Utc::now())?;
                self.drop_cached(hold_id).await;
                Err(BookingError::Conflict { hold_id, slot_id })
            }
            // Transient failure: leave the hold live so the callback can be
            // retried while the TTL lasts.
            Err(e) => Err(e),
        }
    }

    /// Expiry sweep, driven by the caller on a <= 1 s cadence. Also evicts
    /// terminal holds past their retention so the map stays bounded.
    pub async fn sweep_expired(&mut self) -> Vec<Uuid> {
        let now = Utc::now();
        let expired = self.holds.expire_due(now);
        for &id in &expired {
            self.drop_cached(id).await;
            let _ = self.expiry_tx.send(id);
        }
        self.holds.evict_terminal(now);
        expired
    }

    /// Recover the holds persisted by a previous process. Returns the ids
    /// restored live; expired payloads are dropped from the cache, and an
    /// unreadable cache is wiped (every hold in it lands on the expired path).
    pub async fn recover(&mut self) -> Vec<Uuid> {
        let persisted = match self.cache.load_all().await {
            Ok(all) => all,
            Err(e) => {
                warn!(error = %e, "hold cache unreadable, treating as expired");
                let _ = self.cache.clear().await;
                return Vec::new();
            }
        };

        let now = Utc::now();
        let mut restored = Vec::new();
        for hold in persisted {
            let id = hold.hold_id;
            match self.holds.restore(hold, now) {
                Ok(id) => restored.push(id),
                Err(e) => {
                    info!(hold_id = %id, error = %e, "cached hold no longer live, dropping");
                    let _ = self.cache.remove(id).await;
                }
            }
        }
        restored
    }

    async fn persist_hold(&self, hold_id: Uuid) {
        if let Some(hold) = self.holds.get(hold_id) {
            if let Err(e) = self.cache.save(&hold.to_persisted()).await {
                // The hold still works for this process; only recovery suffers.
                warn!(%hold_id, error = %e, "failed to persist hold for recovery");
            }
        }
    }

    async fn drop_cached(&self, hold_id: Uuid) {
        // Removes only this hold's entry; other live holds keep theirs.
        if let Err(e) = self.cache.remove(hold_id).await {
            warn!(%hold_id, error = %e, "failed to drop cached hold");
        }
    }
}
