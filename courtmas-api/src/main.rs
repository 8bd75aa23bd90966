use anyhow::Context;
use chrono::Duration as ChronoDuration;
use courtmas_api::{app, worker, AppState};
use courtmas_booking::BookingEngine;
use courtmas_catalog::{Court, CourtCatalog, OperatingWindow, Sport};
use courtmas_core::payment::MockPaymentProvider;
use courtmas_core::ReservationStore;
use courtmas_store::{DbClient, FileHoldCache, PgReservationStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courtmas_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config =
        courtmas_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!("Starting CourtMas API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let store: Arc<dyn ReservationStore> = Arc::new(PgReservationStore::new(db.pool.clone()));
    let cache = Arc::new(FileHoldCache::new(
        config.business_rules.hold_cache_path.clone(),
    ));

    let window = OperatingWindow::new(
        config.business_rules.start_hour,
        config.business_rules.end_hour,
    )
    .context("Invalid operating window in config")?;

    let mut engine = BookingEngine::new(
        seed_catalog(),
        window,
        store.clone(),
        Arc::new(MockPaymentProvider),
        cache,
        ChronoDuration::seconds(config.business_rules.hold_ttl_seconds as i64),
        Duration::from_millis(config.business_rules.commit_lock_timeout_ms),
    );

    for hold_id in engine.recover().await {
        tracing::info!(%hold_id, "resumed in-flight hold from cache");
    }

    let engine = Arc::new(Mutex::new(engine));

    tokio::spawn(worker::start_expiry_sweeper(
        engine.clone(),
        Duration::from_millis(config.business_rules.expiry_tick_ms),
    ));

    let app_state = AppState {
        engine,
        store,
        admin_listing_limit: config.business_rules.admin_listing_limit,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(app_state)).await?;
    Ok(())
}

fn seed_catalog() -> CourtCatalog {
    let mut catalog = CourtCatalog::new();
    for (id, name, surface, price) in [
        (1, "Court Cempaka", "Rubber", 2000),
        (2, "Court Melati", "Rubber", 2000),
        (3, "Court Kenanga", "Parquet", 1500),
        (4, "Court Seroja", "Parquet", 1500),
    ] {
        catalog.insert(Court {
            id,
            name: name.to_string(),
            surface: surface.to_string(),
            sport: Sport::Badminton,
            price_per_hour_cents: price,
            is_available: true,
        });
    }
    catalog
}
