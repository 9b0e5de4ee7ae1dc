//! Warehouse topology service: warehouses, locations, pallets, lots

use std::collections::BTreeSet;

use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use shared::models::{sort_fefo, Location, Lot, Pallet, PalletStatus, Warehouse};

/// Service for warehouse master data
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct WarehouseRow {
    company_code: String,
    warehouse_code: String,
    center_code: String,
    name: String,
}

#[derive(Debug, FromRow)]
struct LocationRow {
    warehouse_code: String,
    location_code: String,
    permitted_allergen_codes: Vec<String>,
}

#[derive(Debug, FromRow)]
struct PalletRow {
    pallet_id: String,
    status: String,
}

#[derive(Debug, FromRow)]
struct LotRow {
    article_code: String,
    lot_id: String,
    expiry_date: Option<chrono::NaiveDate>,
}

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List warehouses of a company
    pub async fn list_warehouses(&self, company_code: &str) -> AppResult<Vec<Warehouse>> {
        let rows = sqlx::query_as::<_, WarehouseRow>(
            r#"
            SELECT company_code, warehouse_code, center_code, name
            FROM warehouses
            WHERE company_code = $1
            ORDER BY warehouse_code
            "#,
        )
        .bind(company_code)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Warehouse {
                company_code: r.company_code,
                warehouse_code: r.warehouse_code,
                center_code: r.center_code,
                name: r.name,
            })
            .collect())
    }

    /// List locations of a warehouse
    pub async fn list_locations(&self, warehouse_code: &str) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT warehouse_code, location_code, permitted_allergen_codes
            FROM locations
            WHERE warehouse_code = $1
            ORDER BY location_code
            "#,
        )
        .bind(warehouse_code)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(location_from_row).collect())
    }

    /// Get one location with its allergen whitelist
    pub async fn get_location(
        &self,
        warehouse_code: &str,
        location_code: &str,
    ) -> AppResult<Location> {
        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT warehouse_code, location_code, permitted_allergen_codes
            FROM locations
            WHERE warehouse_code = $1 AND location_code = $2
            "#,
        )
        .bind(warehouse_code)
        .bind(location_code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

        Ok(location_from_row(row))
    }

    /// Get a pallet by id, if registered
    pub async fn get_pallet(&self, pallet_id: &str) -> AppResult<Option<Pallet>> {
        let row = sqlx::query_as::<_, PalletRow>(
            "SELECT pallet_id, status FROM pallets WHERE pallet_id = $1",
        )
        .bind(pallet_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(|r| {
            let status = PalletStatus::from_str(&r.status).ok_or_else(|| {
                AppError::Internal(format!("unknown pallet status '{}'", r.status))
            })?;
            Ok(Pallet {
                pallet_id: r.pallet_id,
                status,
            })
        })
        .transpose()
    }

    /// List lots of an article, first-expired-first-out
    ///
    /// FEFO is an allocation hint for callers; the ledger itself never
    /// reorders anything.
    pub async fn list_lots_fefo(&self, article_code: &str) -> AppResult<Vec<Lot>> {
        let rows = sqlx::query_as::<_, LotRow>(
            r#"
            SELECT article_code, lot_id, expiry_date
            FROM lots
            WHERE article_code = $1
            "#,
        )
        .bind(article_code)
        .fetch_all(&self.db)
        .await?;

        let mut lots: Vec<Lot> = rows
            .into_iter()
            .map(|r| Lot {
                article_code: r.article_code,
                lot_id: r.lot_id,
                expiry_date: r.expiry_date,
            })
            .collect();
        sort_fefo(&mut lots);
        Ok(lots)
    }
}

fn location_from_row(row: LocationRow) -> Location {
    Location {
        warehouse_code: row.warehouse_code,
        location_code: row.location_code,
        permitted_allergen_codes: row
            .permitted_allergen_codes
            .into_iter()
            .collect::<BTreeSet<_>>(),
    }
}
