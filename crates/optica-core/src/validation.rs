//! # Validation Module
//!
//! Field-level validation and normalization rules.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field rules, called from input `validate()`          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE service order number, UNIQUE appointment time              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use optica_core::validation::{required_text, optional_text, validate_quantity};
//!
//! assert_eq!(required_text("name", "  Ana Souza ", 200).unwrap(), "Ana Souza");
//! assert_eq!(optional_text(Some("   ".to_string())), None);
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::PaymentMethod;
use crate::{MAX_INSTALLMENTS, MAX_ITEM_QUANTITY, MIN_INSTALLMENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of short text fields (names, phones, descriptions).
pub const MAX_SHORT_TEXT: usize = 200;

/// Maximum length of free-form notes.
pub const MAX_NOTES: usize = 2000;

// =============================================================================
// String Validators
// =============================================================================

/// Trims a required text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most `max` characters
///
/// ## Example
/// ```rust
/// use optica_core::validation::required_text;
///
/// assert!(required_text("phone", "(11) 98888-7777", 30).is_ok());
/// assert!(required_text("phone", "   ", 30).is_err());
/// ```
pub fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Trims an optional text field. Empty strings become `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Like [`optional_text`], but rejects values longer than `max`.
pub fn optional_text_max(
    field: &str,
    value: Option<String>,
    max: usize,
) -> ValidationResult<Option<String>> {
    let value = optional_text(value);
    if let Some(v) = &value {
        if v.chars().count() > max {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max,
            });
        }
    }
    Ok(value)
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (the caller decides what empty means)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
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

/// Validates an amount that may be zero but never negative
/// (unit prices, frame and lens values, discounts).
///
/// ## Example
/// ```rust
/// use optica_core::validation::validate_non_negative_cents;
///
/// assert!(validate_non_negative_cents("discount", 0).is_ok());
/// assert!(validate_non_negative_cents("discount", -100).is_err());
/// ```
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a payment amount in centavos.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates the installment count against the payment method.
///
/// ## Rules
/// ```text
/// installment  ──► installments required, 2..=12
/// anything else ─► installments must be absent
/// ```
pub fn validate_installments(
    method: PaymentMethod,
    installments: Option<i64>,
) -> ValidationResult<()> {
    match (method, installments) {
        (PaymentMethod::Installment, None) => Err(ValidationError::Required {
            field: "installments".to_string(),
        }),
        (PaymentMethod::Installment, Some(n)) if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&n) => {
            Err(ValidationError::OutOfRange {
                field: "installments".to_string(),
                min: MIN_INSTALLMENTS,
                max: MAX_INSTALLMENTS,
            })
        }
        (PaymentMethod::Installment, Some(_)) => Ok(()),
        (_, Some(_)) => Err(ValidationError::InvalidFormat {
            field: "installments".to_string(),
            reason: "only allowed when the payment method is 'installment'".to_string(),
        }),
        (_, None) => Ok(()),
    }
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use optica_core::validation::validate_uuid;
///
/// assert!(validate_uuid("clientId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("clientId", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
