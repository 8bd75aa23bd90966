use crate::error::BookingError;
use chrono::{DateTime, Duration, Utc};
use courtmas_core::{PersistedHold, ReservationDraft};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Lifecycle of a reservation attempt. `Held` is the only live state;
/// everything else is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldStatus {
    Held,
    Committed,
    Expired,
    Cancelled,
    /// Payment succeeded but the slots lost the commit race. Needs manual
    /// reconciliation, never automatic retry.
    Conflict,
}

impl HoldStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, HoldStatus::Held)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HoldStatus::Held => "HELD",
            HoldStatus::Committed => "COMMITTED",
            HoldStatus::Expired => "EXPIRED",
            HoldStatus::Cancelled => "CANCELLED",
            HoldStatus::Conflict => "CONFLICT",
        }
    }
}

/// A time-bounded claim on a validated slot selection, pending payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hold {
    pub id: Uuid,
    pub draft: ReservationDraft,
    pub status: HoldStatus,
    pub expires_at: DateTime<Utc>,
    pub bill_code: Option<String>,
    /// When the hold entered a terminal state; drives eviction.
    pub terminal_at: Option<DateTime<Utc>>,
}

impl Hold {
    /// The boundary is closed: a hold is expired the instant `now` reaches
    /// `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn to_persisted(&self) -> PersistedHold {
        PersistedHold {
            hold_id: self.id,
            draft: self.draft.clone(),
            expires_at: self.expires_at,
            bill_code: self.bill_code.clone(),
        }
    }
}

/// Owns every hold of this process and enforces the state machine
/// `HELD -> {COMMITTED | EXPIRED | CANCELLED | CONFLICT}`.
///
/// The expiry countdown is observed, never reset; callers poll
/// [`HoldManager::expire_due`] on a bounded cadence (<= 1 s).
pub struct HoldManager {
    ttl: Duration,
    holds: HashMap<Uuid, Hold>,
    /// How long terminal holds stay queryable before eviction.
    terminal_retention: Duration,
    /// Conflicts hold a customer's money; operators get a day to reconcile.
    conflict_retention: Duration,
}

impl HoldManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            holds: HashMap::new(),
            terminal_retention: Duration::minutes(15),
            conflict_retention: Duration::hours(24),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Place a hold on a validated draft. Payment is initiated by the caller
    /// once the hold exists.
    pub fn begin(&mut self, draft: ReservationDraft, now: DateTime<Utc>) -> Hold {
        let hold = Hold {
            id: Uuid::new_v4(),
            draft,
            status: HoldStatus::Held,
            expires_at: now + self.ttl,
            bill_code: None,
            terminal_at: None,
        };
        info!(hold_id = %hold.id, expires_at = %hold.expires_at, "hold created");
        self.holds.insert(hold.id, hold.clone());
        hold
    }

    pub fn get(&self, id: Uuid) -> Option<&Hold> {
        self.holds.get(&id)
    }

    pub fn set_bill_code(&mut self, id: Uuid, bill_code: String) -> Result<(), BookingError> {
        let hold = self.live_mut(id, Utc::now())?;
        hold.bill_code = Some(bill_code);
        Ok(())
    }

    /// Customer backs out, or the provider reports a declined/cancelled
    /// transaction. No durable effect to undo.
    pub fn cancel(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<(), BookingError> {
        let hold = self.live_mut(id, now)?;
        hold.status = HoldStatus::Cancelled;
        hold.terminal_at = Some(now);
        info!(hold_id = %id, "hold cancelled");
        Ok(())
    }

    /// Promote a hold after a successful commit.
    pub fn mark_committed(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<(), BookingError> {
        let hold = self.live_mut(id, now)?;
        hold.status = HoldStatus::Committed;
        hold.terminal_at = Some(now);
        Ok(())
    }

    /// Payment succeeded but the commit lost the race.
    pub fn mark_conflict(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<(), BookingError> {
        let hold = self.holds.get_mut(&id).ok_or(BookingError::HoldNotFound(id))?;
        if hold.status.is_terminal() {
            return Err(BookingError::InvalidTransition {
                from: hold.status.as_str().to_string(),
                to: HoldStatus::Conflict.as_str().to_string(),
            });
        }
        hold.status = HoldStatus::Conflict;
        hold.terminal_at = Some(now);
        Ok(())
    }

    /// Sweep: move every overdue hold to `Expired` and return their ids so
    /// the caller can notify the customer and drop cached state.
    pub fn expire_due(&mut self, now: DateTime<Utc>) -> Vec<Uuid> {
        let mut expired = Vec::new();
        for hold in self.holds.values_mut() {
            if hold.status == HoldStatus::Held && hold.is_expired(now) {
                hold.status = HoldStatus::Expired;
                hold.terminal_at = Some(now);
                expired.push(hold.id);
            }
        }
        for id in &expired {
            info!(hold_id = %id, "hold expired");
        }
        expired
    }

    /// Reinstate a hold recovered from the durable cache. An already-expired
    /// payload is refused; the caller treats that as `EXPIRED` and clears
    /// the cache.
    pub fn restore(
        &mut self,
        persisted: PersistedHold,
        now: DateTime<Utc>,
    ) -> Result<Uuid, BookingError> {
        if now >= persisted.expires_at {
            return Err(BookingError::HoldExpired(persisted.hold_id));
        }
        let id = persisted.hold_id;
        let hold = Hold {
            id,
            draft: persisted.draft,
            status: HoldStatus::Held,
            expires_at: persisted.expires_at,
            bill_code: persisted.bill_code,
            terminal_at: None,
        };
        info!(hold_id = %id, expires_at = %hold.expires_at, "hold recovered from cache");
        self.holds.insert(id, hold);
        Ok(id)
    }

    /// Fetch a hold that must still be live: present, `Held`, and not past
    /// its deadline. Reaching the deadline here flips the hold to `Expired`
    /// before refusing, so a commit racing in right at expiry is rejected.
    fn live_mut(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<&mut Hold, BookingError> {
        let hold = self.holds.get_mut(&id).ok_or(BookingError::HoldNotFound(id))?;
        if hold.status.is_terminal() {
            return Err(BookingError::InvalidTransition {
                from: hold.status.as_str().to_string(),
                to: HoldStatus::Held.as_str().to_string(),
            });
        }
        if hold.is_expired(now) {
            hold.status = HoldStatus::Expired;
            hold.terminal_at = Some(now);
            return Err(BookingError::HoldExpired(id));
        }
        Ok(hold)
    }

    /// Drop terminal holds past their retention so the map stays bounded in
    /// a long-running process. Returns the evicted ids.
    pub fn evict_terminal(&mut self, now: DateTime<Utc>) -> Vec<Uuid> {
        let terminal_retention = self.terminal_retention;
        let conflict_retention = self.conflict_retention;
        let mut evicted = Vec::new();
        self.holds.retain(|id, hold| {
            let Some(terminal_at) = hold.terminal_at else {
                return true;
            };
            let retention = match hold.status {
                HoldStatus::Conflict => conflict_retention,
                _ => terminal_retention,
            };
            if now >= terminal_at + retention {
                evicted.push(*id);
                return false;
            }
            true
        });
        for id in &evicted {
            info!(hold_id = %id, "terminal hold evicted");
        }
        evicted
    }
}
