use async_trait::async_trait;
use chrono::NaiveDate;
use courtmas_catalog::SlotId;
use courtmas_core::{CustomerDetails, ReservationRecord, ReservationStore, StoreError};
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use uuid::Uuid;

/// Postgres-backed reservation store. The all-or-nothing batch guarantee
/// comes from writing every slot row inside one transaction; the
/// `uniq_court_slot` constraint turns a lost race into `StoreError::Conflict`.
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_db_err(e: sqlx::Error, slot: Option<&SlotId>) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        // 23505: unique_violation on (court_id, date, hour).
        if db.code().as_deref() == Some("23505") {
            if let Some(slot) = slot {
                return StoreError::Conflict(slot.clone());
            }
        }
    }
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn committed_slots(
        &self,
        court_id: u32,
        date: NaiveDate,
    ) -> Result<HashSet<SlotId>, StoreError> {
        let rows = sqlx::query(
            "SELECT slot_id FROM reservation_slots WHERE court_id = $1 AND date = $2",
        )
        .bind(court_id as i32)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err(e, None))?;

        Ok(rows
            .into_iter()
            .map(|row| SlotId::from(row.get::<String, _>(0)))
            .collect())
    }

    async fn write_reservation(&self, record: &ReservationRecord) -> Result<Uuid, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_err(e, None))?;

        sqlx::query(
            "INSERT INTO reservations \
             (id, court_id, date, start_hour, duration_hours, unit_price_cents, total_cents, \
              customer_name, customer_email, customer_phone, bill_code, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(record.id)
        .bind(record.court_id as i32)
        .bind(record.date)
        .bind(record.start_hour as i16)
        .bind(record.duration_hours as i16)
        .bind(record.unit_price_cents)
        .bind(record.total_cents)
        .bind(&record.customer.name)
        .bind(&record.customer.email)
        .bind(&record.customer.phone)
        .bind(&record.bill_code)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_err(e, None))?;

        for (i, slot_id) in record.slot_ids.iter().enumerate() {
            let hour = record.start_hour as i16 + i as i16;
            sqlx::query(
                "INSERT INTO reservation_slots (reservation_id, court_id, date, hour, slot_id) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(record.id)
            .bind(record.court_id as i32)
            .bind(record.date)
            .bind(hour)
            .bind(slot_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_err(e, Some(slot_id)))?;
        }

        tx.commit().await.map_err(|e| map_db_err(e, None))?;
        Ok(record.id)
    }

    async fn recent_reservations(&self, limit: u32) -> Result<Vec<ReservationRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, court_id, date, start_hour, duration_hours, unit_price_cents, \
             total_cents, customer_name, customer_email, customer_phone, bill_code, created_at \
             FROM reservations ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_err(e, None))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.get("id");
            let slot_rows = sqlx::query(
                "SELECT slot_id FROM reservation_slots WHERE reservation_id = $1 ORDER BY hour",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_err(e, None))?;

            records.push(ReservationRecord {
                id,
                court_id: row.get::<i32, _>("court_id") as u32,
                date: row.get("date"),
                start_hour: row.get::<i16, _>("start_hour") as u8,
                duration_hours: row.get::<i16, _>("duration_hours") as u8,
                slot_ids: slot_rows
                    .into_iter()
                    .map(|r| SlotId::from(r.get::<String, _>(0)))
                    .collect(),
                unit_price_cents: row.get("unit_price_cents"),
                total_cents: row.get("total_cents"),
                customer: CustomerDetails {
                    name: row.get("customer_name"),
                    email: row.get("customer_email"),
                    phone: row.get("customer_phone"),
                },
                bill_code: row.get("bill_code"),
                created_at: row.get("created_at"),
            });
        }

        Ok(records)
    }
}
