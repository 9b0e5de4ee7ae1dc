//! Audit event emission
//!
//! One event is emitted per terminal transfer transition (Applied,
//! PartiallyApplied, Rejected, RolledBack). Events always go to the
//! structured log; when a webhook endpoint is configured they are also
//! POSTed there with an HMAC-SHA256 signature header so the collaborator
//! can verify origin. Delivery failures are logged and never fail the
//! transfer that produced the event.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuditConfig;
use shared::models::{StockRecordKey, TransferStatus};

/// Signature header attached to webhook deliveries
pub const SIGNATURE_HEADER: &str = "X-WSM-Signature";

/// Terminal transfer event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferAuditEvent {
    pub occurred_at: DateTime<Utc>,
    pub requested_by: Uuid,
    pub status: TransferStatus,
    pub source_key: StockRecordKey,
    pub dest_key: StockRecordKey,
    pub requested_quantity: Decimal,
    pub applied_quantity: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Service emitting audit events to log and webhook collaborators
#[derive(Clone)]
pub struct AuditService {
    webhook_url: Option<String>,
    signing_secret: String,
    client: reqwest::Client,
}

impl AuditService {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            webhook_url: config.webhook_url.clone(),
            signing_secret: config.signing_secret.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Emit one terminal transfer event
    pub async fn emit_transfer(&self, event: &TransferAuditEvent) {
        info!(
            status = event.status.as_str(),
            requested_by = %event.requested_by,
            source = %event.source_key,
            dest = %event.dest_key,
            requested_quantity = %event.requested_quantity,
            applied_quantity = %event.applied_quantity,
            reason = event.reason.as_deref().unwrap_or(""),
            "transfer terminal state"
        );

        let Some(url) = &self.webhook_url else {
            return;
        };

        let body = match serde_json::to_vec(event) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to serialize audit event");
                return;
            }
        };
        let signature = sign_payload(&body, &self.signing_secret);

        let result = self
            .client
            .post(url)
            .header(SIGNATURE_HEADER, signature)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                warn!(status = %response.status(), "audit webhook rejected event");
            }
            Err(e) => {
                warn!(error = %e, "audit webhook delivery failed");
            }
        }
    }
}

/// Sign a payload with HMAC-SHA256, base64-encoded
pub fn sign_payload(body: &[u8], secret: &str) -> String {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}
