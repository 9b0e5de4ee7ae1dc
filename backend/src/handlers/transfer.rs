//! HTTP handler for transfer requests
//!
//! The handler assembles the validation context (article, destination
//! location, destination pallet) from master data, then hands the request
//! to the transfer engine. All terminal outcomes come back as 200 with the
//! transfer result body; HTTP errors are reserved for malformed requests
//! and infrastructure faults.

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::{
    StockRecordKey, TransferDestination, TransferPolicy, TransferRequest, TransferResult,
};
use crate::services::catalog::CatalogService;
use crate::services::transfer::TransferContext;
use crate::services::warehouse::WarehouseService;
use crate::AppState;

/// Transfer request body
#[derive(Debug, Deserialize)]
pub struct TransferInput {
    pub source: StockRecordKey,
    pub destination: TransferDestination,
    pub quantity: Decimal,
    #[serde(default)]
    pub policy: TransferPolicy,
}

/// Execute a stock transfer
pub async fn create_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<TransferInput>,
) -> AppResult<Json<TransferResult>> {
    let catalog = CatalogService::new(state.db.clone());
    let warehouses = WarehouseService::new(state.db.clone());

    let article = catalog.get_article(&input.source.article_code).await?;
    let destination_location = warehouses
        .get_location(
            &input.destination.warehouse_code,
            &input.destination.location_code,
        )
        .await?;
    let destination_pallet = match &input.destination.pallet_id {
        Some(pallet_id) => Some(
            warehouses
                .get_pallet(pallet_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Pallet".to_string()))?,
        ),
        None => None,
    };

    let request = TransferRequest {
        source: input.source,
        destination: input.destination,
        quantity: input.quantity,
        requested_by: current_user.0.user_id,
    };
    let ctx = TransferContext {
        article,
        destination_location,
        destination_pallet,
        scope: current_user.0.scope(),
        policy: input.policy,
    };

    let result = state.engine.execute(&request, &ctx).await?;
    Ok(Json(result))
}
