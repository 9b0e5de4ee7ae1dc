//! HTTP handlers for stock ledger endpoints
//!
//! Every mutation checks the caller's warehouse scope before it reaches
//! the ledger; the ledger itself is scope-agnostic.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::{AccessMode, Article, Location, StockRecordKey};
use crate::services::catalog::CatalogService;
use crate::services::warehouse::WarehouseService;
use crate::AppState;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};

/// A stock record addressed by its full key
#[derive(Debug, Serialize)]
pub struct StockRecordResponse {
    pub key: StockRecordKey,
    pub on_hand: Decimal,
    pub reserved: Decimal,
    pub available: Decimal,
}

/// Input for receive, reserve and release operations
#[derive(Debug, Deserialize)]
pub struct QuantityInput {
    pub key: StockRecordKey,
    pub quantity: Decimal,
}

/// Input for signed on-hand adjustments
#[derive(Debug, Deserialize)]
pub struct AdjustInput {
    pub key: StockRecordKey,
    pub delta: Decimal,
}

/// Input for direct moves between two records
#[derive(Debug, Deserialize)]
pub struct MoveInput {
    pub source: StockRecordKey,
    pub destination: StockRecordKey,
    pub quantity: Decimal,
}

/// Both sides of a committed move
#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub source: StockRecordResponse,
    pub destination: StockRecordResponse,
}

fn ensure_compatible(article: &Article, location: &Location) -> AppResult<()> {
    if !location.accepts(article) {
        return Err(AppError::AllergenIncompatible {
            article_code: article.code.clone(),
            location_code: location.location_code.clone(),
        });
    }
    Ok(())
}

/// Only a delta that creates or increases a record needs the gate;
/// decreases never introduce stock at an incompatible location
fn increases_on_hand(delta: Decimal) -> bool {
    delta > Decimal::ZERO
}

/// Records may only be created or increased at locations whose allergen
/// whitelist admits the article.
async fn check_allergen(state: &AppState, key: &StockRecordKey) -> AppResult<()> {
    let article = CatalogService::new(state.db.clone())
        .get_article(&key.article_code)
        .await?;
    let location = WarehouseService::new(state.db.clone())
        .get_location(&key.warehouse_code, &key.location_code)
        .await?;
    ensure_compatible(&article, &location)
}

fn check_scope(user: &CurrentUser, key: &StockRecordKey, mode: AccessMode) -> AppResult<()> {
    if !user
        .0
        .scope()
        .allows(&key.company_code, &key.warehouse_code, mode)
    {
        return Err(AppError::WarehouseNotAuthorized {
            company_code: key.company_code.clone(),
            warehouse_code: key.warehouse_code.clone(),
        });
    }
    Ok(())
}

/// Look up one stock record; absent records report zero quantities
pub async fn lookup_record(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(key): Json<StockRecordKey>,
) -> AppResult<Json<StockRecordResponse>> {
    check_scope(&current_user, &key, AccessMode::Read)?;

    let record = state.ledger.get_record(&key).await?.unwrap_or_default();
    Ok(Json(StockRecordResponse {
        on_hand: record.on_hand,
        reserved: record.reserved,
        available: record.available(),
        key,
    }))
}

/// List stock records of one warehouse, paginated
pub async fn list_warehouse_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_code): Path<String>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<StockRecordResponse>>> {
    let company_code = current_user.0.company_code.clone();
    if !current_user
        .0
        .scope()
        .allows(&company_code, &warehouse_code, AccessMode::Read)
    {
        return Err(AppError::WarehouseNotAuthorized {
            company_code,
            warehouse_code,
        });
    }

    let page = pagination.page.max(1);
    let per_page = pagination.per_page.clamp(1, 200);
    let offset = i64::from(page - 1) * i64::from(per_page);

    let store = state.ledger.store();
    let total = store
        .count_by_warehouse(&company_code, &warehouse_code)
        .await?;
    let rows = store
        .list_by_warehouse(&company_code, &warehouse_code, i64::from(per_page), offset)
        .await?;

    let records = rows
        .into_iter()
        .filter_map(|row| row.into_parts())
        .map(|(key, record)| StockRecordResponse {
            on_hand: record.on_hand,
            reserved: record.reserved,
            available: record.available(),
            key,
        })
        .collect();

    Ok(Json(PaginatedResponse {
        data: records,
        pagination: PaginationMeta::new(page, per_page, total as u64),
    }))
}

/// Receive goods into a stock record
pub async fn receive_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<QuantityInput>,
) -> AppResult<Json<StockRecordResponse>> {
    check_scope(&current_user, &input.key, AccessMode::Write)?;
    check_allergen(&state, &input.key).await?;

    state.ledger.receive(&input.key, input.quantity).await?;
    record_response(&state, input.key).await
}

/// Reserve quantity against a stock record
pub async fn reserve_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<QuantityInput>,
) -> AppResult<Json<StockRecordResponse>> {
    check_scope(&current_user, &input.key, AccessMode::Write)?;

    state.ledger.reserve(&input.key, input.quantity).await?;
    record_response(&state, input.key).await
}

/// Release a reservation
pub async fn release_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<QuantityInput>,
) -> AppResult<Json<StockRecordResponse>> {
    check_scope(&current_user, &input.key, AccessMode::Write)?;

    state.ledger.release(&input.key, input.quantity).await?;
    record_response(&state, input.key).await
}

/// Adjust on-hand by a signed delta
pub async fn adjust_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AdjustInput>,
) -> AppResult<Json<StockRecordResponse>> {
    check_scope(&current_user, &input.key, AccessMode::Write)?;
    if increases_on_hand(input.delta) {
        check_allergen(&state, &input.key).await?;
    }

    state.ledger.adjust(&input.key, input.delta).await?;
    record_response(&state, input.key).await
}

/// Move quantity directly between two records
///
/// Unreserved move for corrections and putaway; transfers with
/// validation and policy handling go through the transfer endpoint.
pub async fn move_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<MoveInput>,
) -> AppResult<Json<MoveResponse>> {
    check_scope(&current_user, &input.source, AccessMode::Write)?;
    check_scope(&current_user, &input.destination, AccessMode::Write)?;
    check_allergen(&state, &input.destination).await?;

    state
        .ledger
        .move_stock(&input.source, &input.destination, input.quantity)
        .await?;

    let source = record_response(&state, input.source).await?.0;
    let destination = record_response(&state, input.destination).await?.0;
    Ok(Json(MoveResponse {
        source,
        destination,
    }))
}

async fn record_response(
    state: &AppState,
    key: StockRecordKey,
) -> AppResult<Json<StockRecordResponse>> {
    let record = state.ledger.get_record(&key).await?.unwrap_or_default();
    Ok(Json(StockRecordResponse {
        on_hand: record.on_hand,
        reserved: record.reserved,
        available: record.available(),
        key,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn article(allergens: &[&str]) -> Article {
        Article {
            code: "ART-001".to_string(),
            description: "Wheat flour 25kg".to_string(),
            alternate_code: None,
            allergen_codes: allergens.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn location(permitted: &[&str]) -> Location {
        Location {
            warehouse_code: "WH1".to_string(),
            location_code: "A-01-01".to_string(),
            permitted_allergen_codes: permitted.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_incompatible_article_rejected_with_stable_code() {
        let err = ensure_compatible(&article(&["GLUTEN"]), &location(&["SOY"])).unwrap_err();
        assert_eq!(err.code(), "ALLERGEN_INCOMPATIBLE");
    }

    #[test]
    fn test_compatible_article_passes() {
        assert!(ensure_compatible(&article(&["GLUTEN"]), &location(&["GLUTEN", "SOY"])).is_ok());
        assert!(ensure_compatible(&article(&[]), &location(&[])).is_ok());
    }

    #[test]
    fn test_only_increasing_adjustments_gate_on_compatibility() {
        assert!(increases_on_hand(Decimal::from_str("0.5").unwrap()));
        assert!(increases_on_hand(Decimal::from_str("100").unwrap()));
        assert!(!increases_on_hand(Decimal::ZERO));
        assert!(!increases_on_hand(Decimal::from_str("-10").unwrap()));
    }
}
