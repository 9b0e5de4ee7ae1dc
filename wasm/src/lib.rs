//! WebAssembly module for the Warehouse Stock Management Platform
//!
//! Provides client-side computation for the handheld scanning client:
//! - Offline scan-code resolution against a catalog snapshot
//! - Allergen compatibility preview before a transfer is submitted
//! - Warehouse scope preview
//! - Offline input validation

use std::str::FromStr;

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::catalog::CatalogIndex;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Offline catalog index built from a backend snapshot
///
/// The scanning client downloads the article list once and resolves
/// scans locally while disconnected; the backend applies the same
/// matching rule when the scan is replayed online.
#[wasm_bindgen]
pub struct OfflineCatalog {
    index: CatalogIndex,
}

#[wasm_bindgen]
impl OfflineCatalog {
    /// Build an index from a JSON array of articles
    #[wasm_bindgen(constructor)]
    pub fn new(articles_json: &str) -> Result<OfflineCatalog, JsValue> {
        let articles: Vec<Article> = serde_json::from_str(articles_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid catalog JSON: {}", e)))?;
        Ok(OfflineCatalog {
            index: CatalogIndex::build(articles),
        })
    }

    /// Resolve a scanned code; returns a JSON array of candidate articles
    pub fn resolve(&self, code: &str) -> Result<String, JsValue> {
        let candidates = self.index.resolve(code);
        serde_json::to_string(&candidates)
            .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
    }

    /// Number of articles in the snapshot
    pub fn size(&self) -> usize {
        self.index.len()
    }
}

/// Check whether an article may be stored at a location
///
/// Both arguments are JSON: the article as served by the catalog
/// endpoint, the location as served by the warehouse endpoint.
#[wasm_bindgen]
pub fn check_location_compatibility(article_json: &str, location_json: &str) -> Result<bool, JsValue> {
    let article: Article = serde_json::from_str(article_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid article JSON: {}", e)))?;
    let location: Location = serde_json::from_str(location_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid location JSON: {}", e)))?;

    Ok(location.accepts(&article))
}

/// Check whether a scope covers a company/warehouse pair for writing
#[wasm_bindgen]
pub fn scope_allows_write(
    scope_json: &str,
    company_code: &str,
    warehouse_code: &str,
) -> Result<bool, JsValue> {
    let scope: AuthorizedScope = serde_json::from_str(scope_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid scope JSON: {}", e)))?;

    Ok(scope.allows(company_code, warehouse_code, AccessMode::Write))
}

/// Normalize a raw scan; returns the trimmed code or an error message
#[wasm_bindgen]
pub fn normalize_scan(raw: &str) -> Result<String, JsValue> {
    normalize_scan_code(raw).map_err(JsValue::from_str)
}

/// Validate an entity code offline before it is sent to the backend
#[wasm_bindgen]
pub fn is_valid_entity_code(code: &str) -> bool {
    validate_entity_code(code).is_ok()
}

/// Validate a lot identifier offline
#[wasm_bindgen]
pub fn is_valid_lot_id(lot_id: &str) -> bool {
    validate_lot_id(lot_id).is_ok()
}

/// Validate a quantity keyed in on the scanning client
///
/// The input must parse as a decimal and be strictly positive; the
/// backend applies the same rule when the operation is submitted.
#[wasm_bindgen]
pub fn is_valid_quantity(input: &str) -> bool {
    Decimal::from_str(input.trim())
        .map(|quantity| validate_quantity_positive(quantity).is_ok())
        .unwrap_or(false)
}
