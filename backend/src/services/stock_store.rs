//! Stock record persistence
//!
//! The ledger mutates stock records through the `StockStore` trait. The
//! store is only responsible for durability; invariant enforcement and
//! per-key exclusivity live in the ledger. `apply_move` must write both
//! records and the movement journal entry atomically — no reader may ever
//! observe a half-applied move.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::AppResult;
use shared::models::{StockRecord, StockRecordKey, StockType};

/// One atomic two-record write plus its journal entry
#[derive(Debug, Clone)]
pub struct StockMove {
    pub source_key: StockRecordKey,
    /// Source record state after the move; pruned when empty
    pub source_after: StockRecord,
    pub dest_key: StockRecordKey,
    pub dest_after: StockRecord,
    pub quantity: Decimal,
}

/// Persistence boundary for stock records
pub trait StockStore: Send + Sync + 'static {
    fn get(
        &self,
        key: &StockRecordKey,
    ) -> impl Future<Output = AppResult<Option<StockRecord>>> + Send;

    /// Upsert one record
    fn put(
        &self,
        key: &StockRecordKey,
        record: StockRecord,
    ) -> impl Future<Output = AppResult<()>> + Send;

    /// Delete one record (pruning)
    fn remove(&self, key: &StockRecordKey) -> impl Future<Output = AppResult<()>> + Send;

    /// Write both sides of a move and journal it, atomically
    fn apply_move(&self, mv: &StockMove) -> impl Future<Output = AppResult<()>> + Send;
}

// ============================================================================
// In-memory store
// ============================================================================

/// HashMap-backed store for tests and development
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    records: Mutex<HashMap<StockRecordKey, StockRecord>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing ledger invariant checks
    pub fn seed(&self, key: StockRecordKey, record: StockRecord) {
        self.records.lock().unwrap().insert(key, record);
    }

    pub fn snapshot(&self) -> HashMap<StockRecordKey, StockRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl StockStore for InMemoryStockStore {
    async fn get(&self, key: &StockRecordKey) -> AppResult<Option<StockRecord>> {
        Ok(self.records.lock().unwrap().get(key).copied())
    }

    async fn put(&self, key: &StockRecordKey, record: StockRecord) -> AppResult<()> {
        self.records.lock().unwrap().insert(key.clone(), record);
        Ok(())
    }

    async fn remove(&self, key: &StockRecordKey) -> AppResult<()> {
        self.records.lock().unwrap().remove(key);
        Ok(())
    }

    async fn apply_move(&self, mv: &StockMove) -> AppResult<()> {
        let mut records = self.records.lock().unwrap();
        if mv.source_after.is_empty() {
            records.remove(&mv.source_key);
        } else {
            records.insert(mv.source_key.clone(), mv.source_after);
        }
        records.insert(mv.dest_key.clone(), mv.dest_after);
        Ok(())
    }
}

// ============================================================================
// Postgres store
// ============================================================================

/// Postgres-backed store; `apply_move` runs in a single transaction
#[derive(Clone)]
pub struct PgStockStore {
    db: PgPool,
}

/// Row mapping for stock record queries
#[derive(Debug, sqlx::FromRow)]
struct StockRecordRow {
    on_hand: Decimal,
    reserved: Decimal,
}

impl PgStockStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List one page of a warehouse's records for read endpoints
    pub async fn list_by_warehouse(
        &self,
        company_code: &str,
        warehouse_code: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<StockRecordListRow>> {
        let rows = sqlx::query_as::<_, StockRecordListRow>(
            r#"
            SELECT company_code, article_code, warehouse_code, location_code,
                   lot_id, pallet_id, stock_type, on_hand, reserved
            FROM stock_records
            WHERE company_code = $1 AND warehouse_code = $2
            ORDER BY article_code, location_code, lot_id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(company_code)
        .bind(warehouse_code)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Total record count of one warehouse
    pub async fn count_by_warehouse(
        &self,
        company_code: &str,
        warehouse_code: &str,
    ) -> AppResult<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM stock_records WHERE company_code = $1 AND warehouse_code = $2",
        )
        .bind(company_code)
        .bind(warehouse_code)
        .fetch_one(&self.db)
        .await?;

        Ok(count.0)
    }
}

/// Key columns in bind order; pallet is stored as '' when absent so the
/// composite primary key stays non-nullable
fn pallet_column(key: &StockRecordKey) -> String {
    key.pallet_id.clone().unwrap_or_default()
}

const KEY_PREDICATE: &str = "company_code = $1 AND article_code = $2 AND warehouse_code = $3 \
     AND location_code = $4 AND lot_id = $5 AND pallet_id = $6 AND stock_type = $7";

impl StockStore for PgStockStore {
    async fn get(&self, key: &StockRecordKey) -> AppResult<Option<StockRecord>> {
        let row = sqlx::query_as::<_, StockRecordRow>(&format!(
            "SELECT on_hand, reserved FROM stock_records WHERE {}",
            KEY_PREDICATE
        ))
        .bind(&key.company_code)
        .bind(&key.article_code)
        .bind(&key.warehouse_code)
        .bind(&key.location_code)
        .bind(&key.lot_id)
        .bind(pallet_column(key))
        .bind(key.stock_type.as_str())
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| StockRecord::new(r.on_hand, r.reserved)))
    }

    async fn put(&self, key: &StockRecordKey, record: StockRecord) -> AppResult<()> {
        upsert_record(&self.db, key, record).await
    }

    async fn remove(&self, key: &StockRecordKey) -> AppResult<()> {
        sqlx::query(&format!(
            "DELETE FROM stock_records WHERE {}",
            KEY_PREDICATE
        ))
        .bind(&key.company_code)
        .bind(&key.article_code)
        .bind(&key.warehouse_code)
        .bind(&key.location_code)
        .bind(&key.lot_id)
        .bind(pallet_column(key))
        .bind(key.stock_type.as_str())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn apply_move(&self, mv: &StockMove) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        if mv.source_after.is_empty() {
            sqlx::query(&format!(
                "DELETE FROM stock_records WHERE {}",
                KEY_PREDICATE
            ))
            .bind(&mv.source_key.company_code)
            .bind(&mv.source_key.article_code)
            .bind(&mv.source_key.warehouse_code)
            .bind(&mv.source_key.location_code)
            .bind(&mv.source_key.lot_id)
            .bind(pallet_column(&mv.source_key))
            .bind(mv.source_key.stock_type.as_str())
            .execute(&mut *tx)
            .await?;
        } else {
            upsert_record_tx(&mut tx, &mv.source_key, mv.source_after).await?;
        }

        upsert_record_tx(&mut tx, &mv.dest_key, mv.dest_after).await?;

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                company_code, article_code, lot_id, stock_type, quantity,
                source_warehouse_code, source_location_code, source_pallet_id,
                dest_warehouse_code, dest_location_code, dest_pallet_id,
                moved_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&mv.source_key.company_code)
        .bind(&mv.source_key.article_code)
        .bind(&mv.source_key.lot_id)
        .bind(mv.source_key.stock_type.as_str())
        .bind(mv.quantity)
        .bind(&mv.source_key.warehouse_code)
        .bind(&mv.source_key.location_code)
        .bind(pallet_column(&mv.source_key))
        .bind(&mv.dest_key.warehouse_code)
        .bind(&mv.dest_key.location_code)
        .bind(pallet_column(&mv.dest_key))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}

const UPSERT_SQL: &str = r#"
    INSERT INTO stock_records (
        company_code, article_code, warehouse_code, location_code,
        lot_id, pallet_id, stock_type, on_hand, reserved, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
    ON CONFLICT (company_code, article_code, warehouse_code, location_code, lot_id, pallet_id, stock_type)
    DO UPDATE SET on_hand = EXCLUDED.on_hand, reserved = EXCLUDED.reserved, updated_at = NOW()
"#;

async fn upsert_record(db: &PgPool, key: &StockRecordKey, record: StockRecord) -> AppResult<()> {
    sqlx::query(UPSERT_SQL)
        .bind(&key.company_code)
        .bind(&key.article_code)
        .bind(&key.warehouse_code)
        .bind(&key.location_code)
        .bind(&key.lot_id)
        .bind(pallet_column(key))
        .bind(key.stock_type.as_str())
        .bind(record.on_hand)
        .bind(record.reserved)
        .execute(db)
        .await?;
    Ok(())
}

async fn upsert_record_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    key: &StockRecordKey,
    record: StockRecord,
) -> AppResult<()> {
    sqlx::query(UPSERT_SQL)
        .bind(&key.company_code)
        .bind(&key.article_code)
        .bind(&key.warehouse_code)
        .bind(&key.location_code)
        .bind(&key.lot_id)
        .bind(pallet_column(key))
        .bind(key.stock_type.as_str())
        .bind(record.on_hand)
        .bind(record.reserved)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Row used when listing stock records for reads and reports
#[derive(Debug, sqlx::FromRow)]
pub struct StockRecordListRow {
    pub company_code: String,
    pub article_code: String,
    pub warehouse_code: String,
    pub location_code: String,
    pub lot_id: String,
    pub pallet_id: String,
    pub stock_type: String,
    pub on_hand: Decimal,
    pub reserved: Decimal,
}

impl StockRecordListRow {
    pub fn into_parts(self) -> Option<(StockRecordKey, StockRecord)> {
        let stock_type = StockType::from_str(&self.stock_type)?;
        let key = StockRecordKey {
            company_code: self.company_code,
            article_code: self.article_code,
            warehouse_code: self.warehouse_code,
            location_code: self.location_code,
            lot_id: self.lot_id,
            pallet_id: if self.pallet_id.is_empty() {
                None
            } else {
                Some(self.pallet_id)
            },
            stock_type,
        };
        Some((key, StockRecord::new(self.on_hand, self.reserved)))
    }
}
