//! # Validation Module
//!
//! Input validation for data crossing the UI boundary.
//!
//! The engines validate before computing anything, so a bad cart or
//! purchase draft fails fast — long before a write-set exists. Storage
//! constraints (key uniqueness) are a separate, later line of defense in
//! the entity store.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CartItem, GstRate, PurchaseLineItem};
use crate::{MAX_BILL_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a quantity value: positive, at most [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price: non-negative (zero is allowed for free samples).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a GST rate: 0% to 100%.
pub fn validate_gst(rate: GstRate) -> ValidationResult<()> {
    if rate.bps() > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "gst".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates a required, bounded name-like field. Returns the trimmed value.
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(value.to_string())
}

/// Validates a batch number: required, at most 50 characters.
pub fn validate_batch_number(batch_number: &str) -> ValidationResult<()> {
    let batch_number = batch_number.trim();

    if batch_number.is_empty() {
        return Err(ValidationError::Required {
            field: "batchNumber".to_string(),
        });
    }

    if batch_number.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "batchNumber".to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates a supplier invoice number: required, at most 50 characters.
pub fn validate_invoice_number(invoice_number: &str) -> ValidationResult<()> {
    let invoice_number = invoice_number.trim();

    if invoice_number.is_empty() {
        return Err(ValidationError::Required {
            field: "invoiceNumber".to_string(),
        });
    }

    if invoice_number.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "invoiceNumber".to_string(),
            max: 50,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a bill cart before generation or edit.
pub fn validate_cart(items: &[CartItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_BILL_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_BILL_ITEMS as i64,
        });
    }

    for item in items {
        validate_quantity(item.quantity)?;
        validate_price("mrp", item.mrp)?;
        validate_gst(item.gst)?;
    }

    Ok(())
}

/// Validates purchase line items before resolution.
///
/// New-product lines must carry the catalogue fields a product document
/// needs; existing-product lines must already reference their product.
pub fn validate_purchase_lines(items: &[PurchaseLineItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for item in items {
        validate_quantity(item.quantity)?;
        validate_price("mrp", item.mrp)?;
        validate_price("purchasePrice", item.purchase_price)?;
        validate_gst(item.gst)?;
        validate_batch_number(&item.batch_number)?;

        if item.is_new_product {
            validate_name("productName", &item.product_name)?;
            validate_name("company", &item.company)?;
        } else if item.product_id.as_deref().map_or(true, str::is_empty) {
            return Err(ValidationError::Required {
                field: "productId".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
