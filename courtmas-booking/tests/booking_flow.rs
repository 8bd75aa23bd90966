use chrono::{Duration, NaiveDate};
use courtmas_booking::{BookingEngine, BookingError, ConfirmOutcome, HoldStatus};
use courtmas_catalog::{Court, CourtCatalog, OperatingWindow, Sport};
use courtmas_core::payment::MockPaymentProvider;
use courtmas_core::{CustomerDetails, HoldCache, PaymentStatus};
use courtmas_store::{MemoryHoldCache, MemoryReservationStore};
use std::sync::Arc;
use std::time::Duration as StdDuration;

fn catalog() -> CourtCatalog {
    let mut catalog = CourtCatalog::new();
    catalog.insert(Court {
        id: 1,
        name: "Court Cempaka".to_string(),
        surface: "Rubber".to_string(),
        sport: Sport::Badminton,
        price_per_hour_cents: 2000,
        is_available: true,
    });
    catalog
}

fn engine(
    store: Arc<MemoryReservationStore>,
    cache: Arc<MemoryHoldCache>,
) -> BookingEngine {
    BookingEngine::new(
        catalog(),
        OperatingWindow::new(8, 23).unwrap(),
        store,
        Arc::new(MockPaymentProvider),
        cache,
        Duration::minutes(15),
        StdDuration::from_secs(10),
    )
}

fn customer() -> CustomerDetails {
    CustomerDetails {
        name: "Aina".to_string(),
        email: "aina@example.com".to_string(),
        phone: "012-3456789".to_string(),
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

#[tokio::test]
async fn select_hold_pay_commit_happy_path() {
    let store = Arc::new(MemoryReservationStore::new());
    let mut engine = engine(store, Arc::new(MemoryHoldCache::new()));

    let board = engine.slots(1, date()).await.unwrap();
    assert_eq!(board.slots.len(), 16);
    assert!(board.slots.iter().all(|s| !s.committed));
    assert!(!board.degraded);

    let selection = engine.validate_selection(1, date(), 14, 2).await.unwrap();
    assert_eq!(selection.total_cents, 4000);

    let receipt = engine
        .begin_hold(1, date(), 14, 2, customer())
        .await
        .unwrap();
    assert!(receipt.payment_url.contains(&receipt.bill_code));

    let outcome = engine
        .confirm_payment(receipt.hold_id, PaymentStatus::Success, None)
        .await
        .unwrap();
    assert!(matches!(outcome, ConfirmOutcome::Committed { .. }));
    assert_eq!(
        engine.hold(receipt.hold_id).unwrap().status,
        HoldStatus::Committed
    );

    // The committed hours are now visible on the grid.
    let board = engine.slots(1, date()).await.unwrap();
    let committed: Vec<u8> = board
        .slots
        .iter()
        .filter(|s| s.committed)
        .map(|s| s.hour)
        .collect();
    assert_eq!(committed, vec![14, 15]);
}

#[tokio::test]
async fn overlapping_sessions_race_to_commit() {
    // Two sessions share the authoritative store; holds are invisible to
    // each other, so both may hold hour 15 concurrently.
    let store = Arc::new(MemoryReservationStore::new());
    let mut session_a = engine(store.clone(), Arc::new(MemoryHoldCache::new()));
    let mut session_b = engine(store, Arc::new(MemoryHoldCache::new()));

    let hold_a = session_a
        .begin_hold(1, date(), 14, 2, customer())
        .await
        .unwrap();
    let hold_b = session_b
        .begin_hold(1, date(), 15, 2, customer())
        .await
        .unwrap();

    // A's payment settles first and wins the commit.
    let outcome = session_a
        .confirm_payment(hold_a.hold_id, PaymentStatus::Success, None)
        .await
        .unwrap();
    assert!(matches!(outcome, ConfirmOutcome::Committed { .. }));

    // B's payment succeeded too, but the slots are gone: reconciliation.
    let err = session_b
        .confirm_payment(hold_b.hold_id, PaymentStatus::Success, None)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Conflict { .. }));
    assert_eq!(
        session_b.hold(hold_b.hold_id).unwrap().status,
        HoldStatus::Conflict
    );
}

#[tokio::test]
async fn pending_keeps_hold_live_and_failed_releases_it() {
    let store = Arc::new(MemoryReservationStore::new());
    let mut engine = engine(store, Arc::new(MemoryHoldCache::new()));

    let receipt = engine
        .begin_hold(1, date(), 10, 1, customer())
        .await
        .unwrap();

    let outcome = engine
        .confirm_payment(receipt.hold_id, PaymentStatus::Pending, None)
        .await
        .unwrap();
    assert_eq!(outcome, ConfirmOutcome::Pending);
    assert_eq!(engine.hold(receipt.hold_id).unwrap().status, HoldStatus::Held);

    let outcome = engine
        .confirm_payment(receipt.hold_id, PaymentStatus::Failed, None)
        .await
        .unwrap();
    assert_eq!(outcome, ConfirmOutcome::Cancelled);
    assert_eq!(
        engine.hold(receipt.hold_id).unwrap().status,
        HoldStatus::Cancelled
    );

    // Nothing was committed.
    let board = engine.slots(1, date()).await.unwrap();
    assert!(board.slots.iter().all(|s| !s.committed));
}

#[tokio::test]
async fn hold_survives_restart_via_cache() {
    let store = Arc::new(MemoryReservationStore::new());
    let cache = Arc::new(MemoryHoldCache::new());

    let mut first = engine(store.clone(), cache.clone());
    let receipt = first
        .begin_hold(1, date(), 18, 2, customer())
        .await
        .unwrap();
    drop(first);

    // "Restarted" process with the same durable cache.
    let mut second = engine(store, cache.clone());
    let recovered = second.recover().await;
    assert_eq!(recovered, vec![receipt.hold_id]);

    let hold = second.hold(receipt.hold_id).unwrap();
    assert_eq!(hold.status, HoldStatus::Held);
    assert_eq!(hold.expires_at, receipt.expires_at);

    let outcome = second
        .confirm_payment(receipt.hold_id, PaymentStatus::Success, None)
        .await
        .unwrap();
    assert!(matches!(outcome, ConfirmOutcome::Committed { .. }));
    // Terminal transition drops the cached payload.
    assert!(cache.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn cancel_releases_hold_and_cache() {
    let store = Arc::new(MemoryReservationStore::new());
    let cache = Arc::new(MemoryHoldCache::new());
    let mut engine = engine(store, cache.clone());

    let receipt = engine
        .begin_hold(1, date(), 9, 1, customer())
        .await
        .unwrap();
    assert_eq!(cache.load_all().await.unwrap().len(), 1);

    engine.cancel_hold(receipt.hold_id).await.unwrap();
    assert_eq!(
        engine.hold(receipt.hold_id).unwrap().status,
        HoldStatus::Cancelled
    );
    assert!(cache.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_holds_keep_independent_recovery_payloads() {
    let store = Arc::new(MemoryReservationStore::new());
    let cache = Arc::new(MemoryHoldCache::new());
    let mut session = engine(store.clone(), cache.clone());

    let first = session
        .begin_hold(1, date(), 10, 1, customer())
        .await
        .unwrap();
    let second = session
        .begin_hold(1, date(), 12, 1, customer())
        .await
        .unwrap();

    // Both holds are recoverable, not just the latest.
    let cached = cache.load_all().await.unwrap();
    assert_eq!(cached.len(), 2);

    // Terminating one hold leaves the other's payload intact.
    session.cancel_hold(first.hold_id).await.unwrap();
    let cached = cache.load_all().await.unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].hold_id, second.hold_id);

    // A restart resumes the surviving hold.
    let mut restarted = engine(store, cache.clone());
    let recovered = restarted.recover().await;
    assert_eq!(recovered, vec![second.hold_id]);
    assert_eq!(
        restarted.hold(second.hold_id).unwrap().status,
        HoldStatus::Held
    );
}

#[tokio::test]
async fn degraded_availability_never_reaches_commit() {
    let store = Arc::new(MemoryReservationStore::new());
    let mut engine = engine(store.clone(), Arc::new(MemoryHoldCache::new()));

    let receipt = engine
        .begin_hold(1, date(), 12, 1, customer())
        .await
        .unwrap();

    store.set_unavailable(true);

    // The grid degrades for display.
    let board = engine.slots(1, date()).await.unwrap();
    assert!(board.degraded);

    // But the commit path refuses to trust an empty index.
    let err = engine
        .confirm_payment(receipt.hold_id, PaymentStatus::Success, None)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Storage(_)));
    // Retriable: the hold is still live.
    assert_eq!(engine.hold(receipt.hold_id).unwrap().status, HoldStatus::Held);

    // Storage comes back and the retry lands.
    store.set_unavailable(false);
    let outcome = engine
        .confirm_payment(receipt.hold_id, PaymentStatus::Success, None)
        .await
        .unwrap();
    assert!(matches!(outcome, ConfirmOutcome::Committed { .. }));
}
