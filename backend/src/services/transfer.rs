//! Transfer Engine: orchestrated movement of quantity between stock records
//!
//! State machine per request:
//!
//! ```text
//! Received -> Validating -> {Rejected | Reserving}
//!                        -> {Rejected | Applying}
//!                        -> {Applied | PartiallyApplied | RolledBack}
//! ```
//!
//! Validation is fail-fast in a fixed order (quantity, authorization for
//! both warehouses, allergen compatibility, destination pallet) and takes
//! no ledger side effect. Once a reservation is taken, the engine owns its
//! cleanup: a store fault during the move releases the reservation before
//! the failure is surfaced, so callers never observe a dangling
//! reservation or a half-applied move. Terminal states are final; there is
//! no automatic retry.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::error::{AppError, AppResult};
use crate::services::audit::{AuditService, TransferAuditEvent};
use crate::services::ledger::StockLedger;
use crate::services::stock_store::StockStore;
use shared::models::{
    AccessMode, Article, AuthorizedScope, Location, Pallet, StockRecordKey, TransferPolicy,
    TransferRequest, TransferResult, TransferStatus,
};

/// Per-request state, tracked for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransferState {
    Received,
    Validating,
    Reserving,
    Applying,
}

/// Collaborator data the engine validates against
///
/// Assembled by the caller (handler) from catalog and warehouse lookups;
/// the engine itself never touches the database for validation data.
#[derive(Debug, Clone)]
pub struct TransferContext {
    pub article: Article,
    pub destination_location: Location,
    pub destination_pallet: Option<Pallet>,
    pub scope: AuthorizedScope,
    pub policy: TransferPolicy,
}

/// The transfer engine over a stock ledger
pub struct TransferEngine<S: StockStore> {
    ledger: Arc<StockLedger<S>>,
    audit: Arc<AuditService>,
}

impl<S: StockStore> TransferEngine<S> {
    pub fn new(ledger: Arc<StockLedger<S>>, audit: Arc<AuditService>) -> Self {
        Self { ledger, audit }
    }

    /// Run one transfer request to a terminal state
    ///
    /// Validation and ledger rejections come back as an `Ok` result with
    /// `Rejected`/`RolledBack` status; `Err` is reserved for
    /// infrastructure faults before any reservation exists.
    #[instrument(skip(self, request, ctx), fields(source = %request.source, requested_by = %request.requested_by))]
    pub async fn execute(
        &self,
        request: &TransferRequest,
        ctx: &TransferContext,
    ) -> AppResult<TransferResult> {
        let mut state = TransferState::Received;
        let dest_key = request.destination_key();
        debug!(?state, quantity = %request.quantity, "transfer received");

        // Validating
        state = TransferState::Validating;
        debug!(?state, "transfer accepted");
        if let Err(err) = self.validate(request, &dest_key, ctx) {
            return Ok(self.reject(request, &dest_key, err).await);
        }

        // Reserving
        state = TransferState::Reserving;
        debug!(?state, "transfer validated");
        let reserved = match ctx.policy {
            TransferPolicy::AllOrNothing => {
                match self.ledger.reserve(&request.source, request.quantity).await {
                    Ok(()) => request.quantity,
                    Err(err @ AppError::InsufficientStock { .. }) => {
                        return Ok(self.reject(request, &dest_key, err).await);
                    }
                    Err(other) => return Err(other),
                }
            }
            TransferPolicy::PartialFill => {
                match self
                    .ledger
                    .reserve_at_most(&request.source, request.quantity)
                    .await
                {
                    Ok(granted) => granted,
                    Err(err @ AppError::InsufficientStock { .. }) => {
                        return Ok(self.reject(request, &dest_key, err).await);
                    }
                    Err(other) => return Err(other),
                }
            }
        };

        // Applying
        state = TransferState::Applying;
        debug!(?state, reserved = %reserved, "reservation taken");
        if let Err(err) = self
            .ledger
            .move_reserved(&request.source, &dest_key, reserved)
            .await
        {
            return Ok(self.roll_back(request, &dest_key, reserved, err).await);
        }

        let status = if reserved == request.quantity {
            TransferStatus::Applied
        } else {
            TransferStatus::PartiallyApplied
        };
        let result = TransferResult {
            status,
            requested_quantity: request.quantity,
            applied_quantity: reserved,
            error_code: None,
            reason: None,
        };
        self.emit(request, &dest_key, &result).await;
        Ok(result)
    }

    /// Fail-fast validation; no ledger side effects
    fn validate(
        &self,
        request: &TransferRequest,
        dest_key: &StockRecordKey,
        ctx: &TransferContext,
    ) -> Result<(), AppError> {
        if request.quantity <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity(format!(
                "transfer quantity must be positive, got {}",
                request.quantity
            )));
        }
        if request.source == *dest_key {
            return Err(AppError::InvalidQuantity(
                "source and destination address the same stock record".to_string(),
            ));
        }

        // Authorization for both sides, write mode
        for warehouse_code in [&request.source.warehouse_code, &dest_key.warehouse_code] {
            if !ctx.scope.allows(
                &request.source.company_code,
                warehouse_code,
                AccessMode::Write,
            ) {
                return Err(AppError::WarehouseNotAuthorized {
                    company_code: request.source.company_code.clone(),
                    warehouse_code: warehouse_code.clone(),
                });
            }
        }

        // Allergen compatibility at the destination
        if !ctx.destination_location.accepts(&ctx.article) {
            return Err(AppError::AllergenIncompatible {
                article_code: ctx.article.code.clone(),
                location_code: ctx.destination_location.location_code.clone(),
            });
        }

        // Destination pallet must be open to receive
        if let Some(pallet) = &ctx.destination_pallet {
            if !pallet.can_receive() {
                return Err(AppError::PalletNotReceiving {
                    pallet_id: pallet.pallet_id.clone(),
                    status: pallet.status.as_str().to_string(),
                });
            }
        }

        Ok(())
    }

    async fn reject(
        &self,
        request: &TransferRequest,
        dest_key: &StockRecordKey,
        err: AppError,
    ) -> TransferResult {
        let result = TransferResult {
            status: TransferStatus::Rejected,
            requested_quantity: request.quantity,
            applied_quantity: Decimal::ZERO,
            error_code: Some(err.code().to_string()),
            reason: Some(err.to_string()),
        };
        self.emit(request, dest_key, &result).await;
        result
    }

    /// Recovery point after a failed move: the reservation is released so
    /// the source record returns to its pre-reservation state
    async fn roll_back(
        &self,
        request: &TransferRequest,
        dest_key: &StockRecordKey,
        reserved: Decimal,
        err: AppError,
    ) -> TransferResult {
        if let Err(release_err) = self.ledger.release(&request.source, reserved).await {
            // The reservation exists; a release failure here is a store
            // fault and the record stays recoverable by key
            tracing::error!(
                source = %request.source,
                error = %release_err,
                "failed to release reservation during rollback"
            );
        }

        let failure = AppError::TransferFailed(err.to_string());
        let result = TransferResult {
            status: TransferStatus::RolledBack,
            requested_quantity: request.quantity,
            applied_quantity: Decimal::ZERO,
            error_code: Some(failure.code().to_string()),
            reason: Some(failure.to_string()),
        };
        self.emit(request, dest_key, &result).await;
        result
    }

    async fn emit(
        &self,
        request: &TransferRequest,
        dest_key: &StockRecordKey,
        result: &TransferResult,
    ) {
        let event = TransferAuditEvent {
            occurred_at: Utc::now(),
            requested_by: request.requested_by,
            status: result.status,
            source_key: request.source.clone(),
            dest_key: dest_key.clone(),
            requested_quantity: result.requested_quantity,
            applied_quantity: result.applied_quantity,
            reason: result.reason.clone(),
        };
        self.audit.emit_transfer(&event).await;
    }
}
