//! Validation utilities for the Warehouse Stock Management Platform
//!
//! Input checks shared between the backend and the scanning client.

use rust_decimal::Decimal;

/// Longest scanned code accepted from any input device
pub const MAX_SCAN_CODE_LEN: usize = 64;

// ============================================================================
// Quantity Validations
// ============================================================================

/// Validate that a quantity is strictly positive
pub fn validate_quantity_positive(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate that a quantity is non-negative
pub fn validate_quantity_non_negative(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Quantity cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Code Format Validations
// ============================================================================

/// Validate an entity code (article, warehouse, location, company)
///
/// 1-20 characters, uppercase alphanumeric plus '-' and '_'.
pub fn validate_entity_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() {
        return Err("Code cannot be empty");
    }
    if code.len() > 20 {
        return Err("Code must be at most 20 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err("Code must be uppercase alphanumeric with '-' or '_'");
    }
    Ok(())
}

/// Validate a lot identifier
///
/// Empty is allowed (article without lot tracking).
pub fn validate_lot_id(lot_id: &str) -> Result<(), &'static str> {
    if lot_id.len() > 30 {
        return Err("Lot id must be at most 30 characters");
    }
    if lot_id.chars().any(|c| c.is_whitespace()) {
        return Err("Lot id cannot contain whitespace");
    }
    Ok(())
}

/// Normalize a raw scanned string
///
/// Trims surrounding whitespace and rejects empty or oversized scans.
pub fn normalize_scan_code(raw: &str) -> Result<String, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Scanned code is empty");
    }
    if trimmed.len() > MAX_SCAN_CODE_LEN {
        return Err("Scanned code is too long");
    }
    Ok(trimmed.to_string())
}

/// Validate an allergen code (e.g., "GLUTEN")
pub fn validate_allergen_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() {
        return Err("Allergen code cannot be empty");
    }
    if !code.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
        return Err("Allergen code must be uppercase letters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_quantity_validations() {
        assert!(validate_quantity_positive(dec("0.001")).is_ok());
        assert!(validate_quantity_positive(dec("0")).is_err());
        assert!(validate_quantity_positive(dec("-1")).is_err());
        assert!(validate_quantity_non_negative(dec("0")).is_ok());
    }

    #[test]
    fn test_entity_code_format() {
        assert!(validate_entity_code("ART-001").is_ok());
        assert!(validate_entity_code("WH_MAIN").is_ok());
        assert!(validate_entity_code("").is_err());
        assert!(validate_entity_code("lowercase").is_err());
        assert!(validate_entity_code(&"X".repeat(21)).is_err());
    }

    #[test]
    fn test_scan_code_normalization() {
        assert_eq!(normalize_scan_code("  ART-001 \n").unwrap(), "ART-001");
        assert!(normalize_scan_code("   ").is_err());
        assert!(normalize_scan_code(&"9".repeat(MAX_SCAN_CODE_LEN + 1)).is_err());
    }

    #[test]
    fn test_lot_id_rules() {
        assert!(validate_lot_id("").is_ok());
        assert!(validate_lot_id("L2026-01").is_ok());
        assert!(validate_lot_id("has space").is_err());
    }
}
