//! Warehouse authorization grants
//!
//! The per-request scope travels in JWT claims (see the auth middleware);
//! this service administers the grant rows the identity provider reads
//! when it issues a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Service managing per-user warehouse grants
#[derive(Clone)]
pub struct ScopeService {
    db: PgPool,
}

/// One stored grant
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WarehouseGrant {
    pub user_id: Uuid,
    pub company_code: String,
    pub center_code: String,
    pub warehouse_code: String,
    pub granted_at: DateTime<Utc>,
}

/// Input for granting warehouse access
#[derive(Debug, Deserialize)]
pub struct GrantInput {
    pub user_id: Uuid,
    pub company_code: String,
    pub center_code: String,
    pub warehouse_code: String,
}

impl ScopeService {
    /// Create a new ScopeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List grants of a user
    pub async fn list_grants(&self, user_id: Uuid) -> AppResult<Vec<WarehouseGrant>> {
        let grants = sqlx::query_as::<_, WarehouseGrant>(
            r#"
            SELECT user_id, company_code, center_code, warehouse_code, granted_at
            FROM warehouse_grants
            WHERE user_id = $1
            ORDER BY company_code, warehouse_code
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(grants)
    }

    /// Grant warehouse access to a user
    pub async fn grant(&self, input: GrantInput) -> AppResult<WarehouseGrant> {
        shared::validation::validate_entity_code(&input.warehouse_code).map_err(|msg| {
            AppError::Validation {
                field: "warehouse_code".to_string(),
                message: msg.to_string(),
            }
        })?;

        let grant = sqlx::query_as::<_, WarehouseGrant>(
            r#"
            INSERT INTO warehouse_grants (user_id, company_code, center_code, warehouse_code)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, company_code, warehouse_code) DO UPDATE
                SET center_code = EXCLUDED.center_code
            RETURNING user_id, company_code, center_code, warehouse_code, granted_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.company_code)
        .bind(&input.center_code)
        .bind(&input.warehouse_code)
        .fetch_one(&self.db)
        .await?;

        Ok(grant)
    }

    /// Revoke a grant
    pub async fn revoke(
        &self,
        user_id: Uuid,
        company_code: &str,
        warehouse_code: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM warehouse_grants
            WHERE user_id = $1 AND company_code = $2 AND warehouse_code = $3
            "#,
        )
        .bind(user_id)
        .bind(company_code)
        .bind(warehouse_code)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Warehouse grant".to_string()));
        }

        Ok(())
    }
}
