//! Reporting service: stock balance listing and CSV export

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};

/// Service for stock balance reports
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// One stock balance line
#[derive(Debug, Serialize, FromRow)]
pub struct StockBalanceRow {
    pub article_code: String,
    pub description: String,
    pub warehouse_code: String,
    pub location_code: String,
    pub lot_id: String,
    pub pallet_id: String,
    pub stock_type: String,
    pub on_hand: Decimal,
    pub reserved: Decimal,
    pub available: Decimal,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Current stock balances for a company
    pub async fn stock_balances(&self, company_code: &str) -> AppResult<Vec<StockBalanceRow>> {
        let rows = sqlx::query_as::<_, StockBalanceRow>(
            r#"
            SELECT s.article_code,
                   COALESCE(a.description, '') AS description,
                   s.warehouse_code, s.location_code, s.lot_id, s.pallet_id, s.stock_type,
                   s.on_hand, s.reserved, s.on_hand - s.reserved AS available
            FROM stock_records s
            LEFT JOIN articles a ON a.code = s.article_code
            WHERE s.company_code = $1
            ORDER BY s.article_code, s.warehouse_code, s.location_code, s.lot_id
            "#,
        )
        .bind(company_code)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Render stock balances as CSV
    pub fn to_csv(rows: &[StockBalanceRow]) -> AppResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| AppError::Internal(format!("Failed to write CSV row: {}", e)))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("Failed to flush CSV writer: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("CSV output is not UTF-8: {}", e)))
    }
}
